use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid IPv4 address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR prefix: {0}")]
    InvalidCidr(String),

    #[error("Invalid DNS suffix: {0}")]
    InvalidDnsSuffix(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Broker error: {0}")]
    BrokerError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
