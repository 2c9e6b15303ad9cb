use std::sync::atomic::{AtomicU32, Ordering};

/// One word of device memory: an f32 stored as its bit pattern.
///
/// Accesses are relaxed; ordering between threads comes from the block
/// barrier and from the launch join, never from the words themselves.
#[derive(Debug, Default)]
pub(crate) struct F32Cell(AtomicU32);

impl F32Cell {
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Allocate `len` zero-initialized words.
pub(crate) fn zeroed_words(len: usize) -> Vec<F32Cell> {
    let mut words = Vec::with_capacity(len);
    words.resize_with(len, F32Cell::default);
    words
}
