use std::fmt::Debug;

use crate::error::Result;

/// Trait for pluggable matrix-multiply execution strategies.
///
/// All operations work on row-major f32 slices. Data is passed in as slices
/// and returned as an owned vector; the backend performs the computation
/// and owns whatever staging it needs (device buffers, launch geometry).
pub trait MatmulBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "reference", "tiled").
    fn name(&self) -> &str;

    /// Matrix multiplication: C = A @ B.
    ///
    /// - `a`: row-major data of shape [m, k]
    /// - `b`: row-major data of shape [k, n]
    /// - Returns: row-major data of shape [m, n]
    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>>;
}
