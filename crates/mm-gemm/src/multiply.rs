use std::time::{Duration, Instant};

use crate::backend::MatmulBackend;
use crate::error::{GemmError, Result};
use crate::matrix::Matrix;
use crate::tiled::TiledBackend;

/// Tile width used when the caller does not pick one.
pub const DEFAULT_TILE_WIDTH: usize = 16;

/// Configuration for a tiled multiplication.
#[derive(Debug, Clone)]
pub struct GemmConfig {
    /// Side length of the square thread block and of the staged sub-tiles.
    pub tile_width: usize,
}

impl GemmConfig {
    pub fn with_tile_width(tile_width: usize) -> Self {
        GemmConfig { tile_width }
    }
}

impl Default for GemmConfig {
    fn default() -> Self {
        GemmConfig {
            tile_width: DEFAULT_TILE_WIDTH,
        }
    }
}

/// Multiply two matrices with the given backend.
///
/// The inner-dimension check happens here, before the backend touches the
/// data - a mismatch is rejected without any device allocation.
pub fn multiply_with(
    backend: &dyn MatmulBackend,
    a: &Matrix,
    b: &Matrix,
) -> Result<Matrix> {
    let (m, k) = a.dims();
    let (k2, n) = b.dims();
    if k != k2 {
        return Err(GemmError::DimensionMismatch { m, k, k2, n });
    }

    let data = backend.matmul(a.data(), b.data(), m, k, n)?;
    Ok(Matrix::from_vec(m, n, data))
}

/// Compute A @ B on a fresh device with the configured tile width.
///
/// This is the pure entry point wrapper layers call: matrices in, product
/// out, no plugin or framework state anywhere.
pub fn multiply(a: &Matrix, b: &Matrix, config: &GemmConfig) -> Result<Matrix> {
    let backend = TiledBackend::new(config.tile_width)?;
    multiply_with(&backend, a, b)
}

/// Like [`multiply`], also reporting wall-clock elapsed time.
pub fn multiply_timed(
    a: &Matrix,
    b: &Matrix,
    config: &GemmConfig,
) -> Result<(Matrix, Duration)> {
    let start = Instant::now();
    let product = multiply(a, b, config)?;
    Ok((product, start.elapsed()))
}
