use async_trait::async_trait;
use dnsbl_application::ports::PrefixSource;
use dnsbl_domain::DomainError;
use serde::Deserialize;
use tracing::{error, instrument};

#[derive(Debug, Deserialize)]
struct PrefixFile {
    prefixes: Vec<String>,
}

/// `PrefixSource` adapter reading a flat YAML list of CIDR blocks off
/// disk, e.g.:
///
/// ```yaml
/// prefixes:
///   - 192.0.2.0/24
///   - 198.51.100.0/28
/// ```
pub struct YamlPrefixSource {
    path: String,
}

impl YamlPrefixSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PrefixSource for YamlPrefixSource {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Vec<String>, DomainError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            error!(error = %e, path = %self.path, "failed to read prefix list");
            DomainError::ConfigError(format!("failed to read {}: {e}", self.path))
        })?;

        let parsed: PrefixFile = serde_yaml::from_str(&contents).map_err(|e| {
            error!(error = %e, path = %self.path, "failed to parse prefix list");
            DomainError::ConfigError(format!("malformed prefix list {}: {e}", self.path))
        })?;

        Ok(parsed.prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_prefixes_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prefixes:\n  - 192.0.2.0/24\n  - 198.51.100.0/28").unwrap();

        let source = YamlPrefixSource::new(file.path().to_str().unwrap());
        let prefixes = source.load().await.unwrap();

        assert_eq!(prefixes, vec!["192.0.2.0/24", "198.51.100.0/28"]);
    }

    #[tokio::test]
    async fn missing_file_is_a_config_error() {
        let source = YamlPrefixSource::new("/nonexistent/path/prefixes.yaml");
        assert!(source.load().await.is_err());
    }
}
