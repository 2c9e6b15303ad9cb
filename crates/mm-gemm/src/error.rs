use thiserror::Error;

#[derive(Error, Debug)]
pub enum GemmError {
    #[error("dimension mismatch: left is {m}x{k}, right is {k2}x{n}")]
    DimensionMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("invalid tile width {0}: must be between 1 and 32")]
    InvalidTileWidth(usize),
    #[error("device error: {0}")]
    Device(#[from] mm_device::DeviceError),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GemmError>;
