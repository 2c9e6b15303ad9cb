use mm_device::{Device, LaunchGeometry};

use crate::backend::MatmulBackend;
use crate::error::{GemmError, Result};
use crate::kernel::TiledMatmulKernel;

/// Largest supported tile width; a 32x32 block is the device's 1024-thread
/// block cap.
pub const MAX_TILE_WIDTH: usize = 32;

/// Host orchestrator for the tiled multiply: stages inputs onto a device,
/// derives the launch geometry, dispatches the kernel, and reads back the
/// product. Owns no arithmetic.
#[derive(Debug)]
pub struct TiledBackend {
    device: Device,
    tile_width: usize,
}

impl TiledBackend {
    /// A tiled backend on a fresh default device.
    ///
    /// # Errors
    /// Returns `InvalidTileWidth` unless `1 <= tile_width <= MAX_TILE_WIDTH`.
    pub fn new(tile_width: usize) -> Result<Self> {
        Self::with_device(Device::default(), tile_width)
    }

    /// A tiled backend on an existing device. Several backends with
    /// different tile widths can share one device.
    pub fn with_device(device: Device, tile_width: usize) -> Result<Self> {
        if tile_width == 0 || tile_width > MAX_TILE_WIDTH {
            return Err(GemmError::InvalidTileWidth(tile_width));
        }
        Ok(TiledBackend { device, tile_width })
    }

    pub fn tile_width(&self) -> usize {
        self.tile_width
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl MatmulBackend for TiledBackend {
    fn name(&self) -> &str {
        "tiled"
    }

    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        if a.len() != m * k {
            return Err(GemmError::Other(format!(
                "matmul: a.len()={} but expected m*k={}",
                a.len(),
                m * k
            )));
        }
        if b.len() != k * n {
            return Err(GemmError::Other(format!(
                "matmul: b.len()={} but expected k*n={}",
                b.len(),
                k * n
            )));
        }
        // An empty output needs no launch.
        if m == 0 || n == 0 {
            return Ok(Vec::new());
        }

        let d_a = self.device.htod(a)?;
        let d_b = self.device.htod(b)?;
        // The kernel writes every element of C exactly once.
        let d_c = self.device.alloc(m * n)?;

        let geometry = LaunchGeometry::for_output(m, n, self.tile_width);
        let kernel = TiledMatmulKernel {
            a: &d_a,
            b: &d_b,
            c: &d_c,
            m,
            k,
            n,
            tile: self.tile_width,
        };
        self.device
            .launch(geometry, kernel.shared_words(), &kernel)?;

        Ok(d_c.to_host())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceBackend;
    use approx::assert_relative_eq;
    use mm_device::DeviceError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Integer-valued inputs keep both backends exact, so results must be
    /// identical bit for bit.
    fn integer_matrix(rows: usize, cols: usize) -> Vec<f32> {
        (0..rows * cols).map(|i| (i % 7) as f32 - 3.0).collect()
    }

    #[test]
    fn test_matches_reference_exactly_for_integers() {
        let tiled = TiledBackend::new(4).unwrap();
        let reference = ReferenceBackend::new();

        // k = 10 is not a multiple of the tile width.
        let (m, k, n) = (8, 10, 6);
        let a = integer_matrix(m, k);
        let b = integer_matrix(k, n);

        let got = tiled.matmul(&a, &b, m, k, n).unwrap();
        let want = reference.matmul(&a, &b, m, k, n).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn test_all_dimensions_off_tile_boundary() {
        let tiled = TiledBackend::new(4).unwrap();
        let reference = ReferenceBackend::new();

        let (m, k, n) = (7, 9, 5);
        let a = integer_matrix(m, k);
        let b = integer_matrix(k, n);

        let got = tiled.matmul(&a, &b, m, k, n).unwrap();
        let want = reference.matmul(&a, &b, m, k, n).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn test_random_inputs_within_tolerance() {
        let tiled = TiledBackend::new(8).unwrap();
        let reference = ReferenceBackend::new();
        let mut rng = StdRng::seed_from_u64(42);

        let (m, k, n) = (9, 17, 5);
        let a: Vec<f32> = (0..m * k).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let b: Vec<f32> = (0..k * n).map(|_| rng.gen_range(-1.0..1.0)).collect();

        let got = tiled.matmul(&a, &b, m, k, n).unwrap();
        let want = reference.matmul(&a, &b, m, k, n).unwrap();
        for (g, w) in got.iter().zip(&want) {
            assert_relative_eq!(*g, *w, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_tile_widths_coexist() {
        let reference = ReferenceBackend::new();
        let (m, k, n) = (6, 6, 6);
        let a = integer_matrix(m, k);
        let b = integer_matrix(k, n);
        let want = reference.matmul(&a, &b, m, k, n).unwrap();

        let device = Device::default();
        for tile_width in [1, 2, 3, 5, 8] {
            let tiled =
                TiledBackend::with_device(device.clone(), tile_width).unwrap();
            let got = tiled.matmul(&a, &b, m, k, n).unwrap();
            assert_eq!(got, want, "tile width {tile_width}");
        }
    }

    #[test]
    fn test_repeated_runs_bit_identical() {
        let tiled = TiledBackend::new(4).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let (m, k, n) = (5, 6, 7);
        let a: Vec<f32> = (0..m * k).map(|_| rng.gen_range(-10.0..10.0)).collect();
        let b: Vec<f32> = (0..k * n).map(|_| rng.gen_range(-10.0..10.0)).collect();

        let first = tiled.matmul(&a, &b, m, k, n).unwrap();
        let second = tiled.matmul(&a, &b, m, k, n).unwrap();
        let first_bits: Vec<u32> = first.iter().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u32> = second.iter().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
    }

    #[test]
    fn test_invalid_tile_width() {
        assert!(matches!(
            TiledBackend::new(0),
            Err(GemmError::InvalidTileWidth(0))
        ));
        assert!(matches!(
            TiledBackend::new(33),
            Err(GemmError::InvalidTileWidth(33))
        ));
    }

    #[test]
    fn test_allocation_failure_surfaces() {
        // Too small to stage even the first input.
        let device = Device::with_capacity(10);
        let tiled = TiledBackend::with_device(device, 2).unwrap();
        let a = vec![1.0; 16];
        let b = vec![1.0; 16];
        let err = tiled.matmul(&a, &b, 4, 4, 4).unwrap_err();
        assert!(matches!(
            err,
            GemmError::Device(DeviceError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_empty_output_short_circuits() {
        let tiled = TiledBackend::new(4).unwrap();
        let b = vec![1.0; 9];
        let got = tiled.matmul(&[], &b, 0, 3, 3).unwrap();
        assert!(got.is_empty());
    }
}
