use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub app_log_path: Option<String>,

    #[serde(default)]
    pub error_log_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            app_log_path: None,
            error_log_path: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
