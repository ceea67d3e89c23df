use thiserror::Error;

pub type CvaultResult<T> = Result<T, CvaultError>;

#[derive(Debug, Error)]
pub enum CvaultError {
    #[error(transparent)]
    Crypto(#[from] cvault_crypto::CryptoError),

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
