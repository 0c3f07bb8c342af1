use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid bind address {0}: {1}")]
    InvalidAddress(String, std::net::AddrParseError),
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("server error: {0}")]
    Server(String),
}
