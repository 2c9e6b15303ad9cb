use std::sync::Arc;

use crate::device::DeviceInner;
use crate::error::{DeviceError, Result};
use crate::word::{zeroed_words, F32Cell};

/// A device-resident linear buffer of f32 words.
///
/// Created through [`Device::alloc`](crate::Device::alloc) or
/// [`Device::htod`](crate::Device::htod); its words return to the device
/// pool on drop. Kernels access words with [`load`](Self::load) and
/// [`store`](Self::store); the host copies whole buffers with
/// [`copy_from_host`](Self::copy_from_host) and [`to_host`](Self::to_host),
/// never while a launch is in flight.
#[derive(Debug)]
pub struct DeviceBuffer {
    words: Vec<F32Cell>,
    device: Arc<DeviceInner>,
}

impl DeviceBuffer {
    pub(crate) fn new(device: Arc<DeviceInner>, len: usize) -> Self {
        DeviceBuffer {
            words: zeroed_words(len),
            device,
        }
    }

    /// Number of words in the buffer.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the buffer holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Copies `host` into the buffer (host-to-device).
    ///
    /// # Errors
    /// Returns `CopySizeMismatch` if `host.len()` differs from the buffer
    /// length.
    pub fn copy_from_host(&self, host: &[f32]) -> Result<()> {
        if host.len() != self.words.len() {
            return Err(DeviceError::CopySizeMismatch {
                expected: self.words.len(),
                got: host.len(),
            });
        }
        for (word, &value) in self.words.iter().zip(host) {
            word.store(value);
        }
        Ok(())
    }

    /// Copies the buffer out to the host (device-to-host).
    pub fn to_host(&self) -> Vec<f32> {
        self.words.iter().map(F32Cell::load).collect()
    }

    /// Reads the word at `idx` (kernel-side access).
    ///
    /// # Panics
    /// Panics if `idx` is out of range (kernel fault).
    pub fn load(&self, idx: usize) -> f32 {
        self.words[idx].load()
    }

    /// Writes the word at `idx` (kernel-side access).
    ///
    /// # Panics
    /// Panics if `idx` is out of range (kernel fault).
    pub fn store(&self, idx: usize, value: f32) {
        self.words[idx].store(value);
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        self.device.release(self.words.len());
    }
}
