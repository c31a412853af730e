use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HwError {
    #[error("invalid oscillator model: {0}")]
    Oscillator(&'static str),
    #[error("invalid signal source: {0}")]
    Signal(&'static str),
}

pub type Result<T> = std::result::Result<T, HwError>;
