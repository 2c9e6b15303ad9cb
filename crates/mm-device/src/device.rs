use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::buffer::DeviceBuffer;
use crate::error::{DeviceError, Result};

/// Default device memory size: 2^26 words (256 MiB of f32).
pub const DEFAULT_MEMORY_WORDS: usize = 1 << 26;

/// Configuration for a [`Device`].
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Total device memory, in f32 words.
    pub memory_words: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            memory_words: DEFAULT_MEMORY_WORDS,
        }
    }
}

/// A virtual massively-parallel compute device.
///
/// Owns a bounded pool of word-addressed memory from which
/// [`DeviceBuffer`]s are allocated, and executes kernels over a grid of
/// thread blocks (see [`Device::launch`](crate::launch)). Cloning is cheap
/// and shares the same memory pool.
#[derive(Debug, Clone)]
pub struct Device {
    inner: Arc<DeviceInner>,
}

#[derive(Debug)]
pub(crate) struct DeviceInner {
    capacity_words: usize,
    used_words: AtomicUsize,
}

impl DeviceInner {
    /// Reserves `len` words, failing if the pool cannot cover them.
    fn reserve(&self, len: usize) -> Result<()> {
        self.used_words
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                used.checked_add(len)
                    .filter(|&total| total <= self.capacity_words)
            })
            .map(|_| ())
            .map_err(|used| DeviceError::AllocationFailure {
                requested: len,
                free: self.capacity_words - used,
            })
    }

    /// Returns `len` words to the pool; called when a buffer drops.
    pub(crate) fn release(&self, len: usize) {
        self.used_words.fetch_sub(len, Ordering::SeqCst);
    }
}

impl Device {
    pub fn new(config: DeviceConfig) -> Self {
        Device {
            inner: Arc::new(DeviceInner {
                capacity_words: config.memory_words,
                used_words: AtomicUsize::new(0),
            }),
        }
    }

    /// A device with `memory_words` of capacity. Mainly for tests that
    /// exercise allocation failure.
    pub fn with_capacity(memory_words: usize) -> Self {
        Device::new(DeviceConfig { memory_words })
    }

    /// Allocates a zero-filled buffer of `len` words.
    ///
    /// # Errors
    /// Returns `AllocationFailure` if the device cannot cover `len` words.
    pub fn alloc(&self, len: usize) -> Result<DeviceBuffer> {
        self.inner.reserve(len)?;
        Ok(DeviceBuffer::new(Arc::clone(&self.inner), len))
    }

    /// Allocates a buffer and copies `host` into it (host-to-device).
    pub fn htod(&self, host: &[f32]) -> Result<DeviceBuffer> {
        let buffer = self.alloc(host.len())?;
        buffer.copy_from_host(host)?;
        Ok(buffer)
    }

    /// Total device memory, in words.
    pub fn capacity_words(&self) -> usize {
        self.inner.capacity_words
    }

    /// Words currently held by live buffers.
    pub fn allocated_words(&self) -> usize {
        self.inner.used_words.load(Ordering::SeqCst)
    }
}

impl Default for Device {
    fn default() -> Self {
        Device::new(DeviceConfig::default())
    }
}
