use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("spi error: {0}")]
    Spi(String),
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("adc channel {0} out of range (0..=7)")]
    InvalidChannel(u8),
    #[error("short spi transfer: {0} of 3 bytes")]
    ShortTransfer(usize),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
