//! `mm-device` - Virtual massively-parallel compute device for matmul-runtime.
//!
//! This crate provides:
//! - A `Device` with word-addressed buffer allocation and host transfers
//! - `LaunchGeometry` derivation (grid-of-blocks x threads-per-block)
//! - A `Kernel` trait and a block/thread executor with per-block shared
//!   memory and a poisonable block barrier
//! - Fault capture: any in-kernel panic surfaces as a single `LaunchFault`
//!
//! Blocks execute independently with no cross-block ordering; within a
//! block, the barrier is the only synchronization primitive.

pub mod barrier;
pub mod buffer;
pub mod device;
pub mod error;
pub mod grid;
pub mod launch;
pub mod shared;
mod word;

// Re-export primary types at the crate root for convenience.
pub use barrier::BlockBarrier;
pub use buffer::DeviceBuffer;
pub use device::{Device, DeviceConfig, DEFAULT_MEMORY_WORDS};
pub use error::{DeviceError, Result};
pub use grid::{Dim2, LaunchGeometry};
pub use launch::{Kernel, ThreadCtx, MAX_BLOCK_THREADS};
pub use shared::SharedMem;
