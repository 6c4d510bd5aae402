use serde::{Deserialize, Serialize};

/// Broker connection parameters for the Work Queue (C3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_queue_name")]
    pub default_queue: String,

    /// N workers in the Worker Pool (C6).
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Maximum tasks per publish batch during synchronization (§4.5 step 6).
    #[serde(default = "default_publish_batch_size")]
    pub publish_batch_size: usize,
}

impl QueueConfig {
    pub fn amqp_url(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/%2f",
            self.username, self.password, self.host, self.port
        )
    }

    /// `min(2*workers, 100)`, per §4.3.
    pub fn prefetch_count(&self) -> u16 {
        (2 * self.concurrency_limit).min(100) as u16
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_username(),
            password: default_password(),
            default_queue: default_queue_name(),
            concurrency_limit: default_concurrency_limit(),
            publish_batch_size: default_publish_batch_size(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    5672
}
fn default_username() -> String {
    "guest".to_string()
}
fn default_password() -> String {
    "guest".to_string()
}
fn default_queue_name() -> String {
    "dnsbl_task_queue".to_string()
}
fn default_concurrency_limit() -> usize {
    50
}
fn default_publish_batch_size() -> usize {
    10_000
}
