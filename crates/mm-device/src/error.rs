use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device allocation failed: requested {requested} words, {free} free")]
    AllocationFailure { requested: usize, free: usize },
    #[error("host copy size mismatch: buffer holds {expected} words, got {got}")]
    CopySizeMismatch { expected: usize, got: usize },
    #[error("invalid launch geometry: {0}")]
    InvalidLaunch(String),
    #[error("kernel launch faulted: {0}")]
    LaunchFault(String),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
