//! `mm-gemm` - Tiled matrix multiplication for matmul-runtime.
//!
//! This crate provides:
//! - A row-major `Matrix` type
//! - A `MatmulBackend` trait for pluggable multiply strategies
//! - A naive `ReferenceBackend` used as the correctness oracle
//! - The `TiledBackend` host orchestrator and its shared-memory tiled
//!   kernel, executed on an `mm-device` virtual device
//! - `multiply` / `multiply_timed` entry points for wrapper layers

pub mod backend;
pub mod error;
mod kernel;
pub mod matrix;
pub mod multiply;
pub mod reference;
pub mod tiled;

// Re-export primary types at the crate root for convenience.
pub use backend::MatmulBackend;
pub use error::{GemmError, Result};
pub use matrix::Matrix;
pub use multiply::{
    multiply, multiply_timed, multiply_with, GemmConfig, DEFAULT_TILE_WIDTH,
};
pub use reference::ReferenceBackend;
pub use tiled::{TiledBackend, MAX_TILE_WIDTH};
