use crate::word::{zeroed_words, F32Cell};

/// Block-local fast storage, shared by every thread of one block.
///
/// Sized at launch, zero-initialized, and dropped when the block finishes.
/// Threads address it by word index; an out-of-range index is a kernel
/// fault and aborts the launch.
#[derive(Debug)]
pub struct SharedMem {
    words: Vec<F32Cell>,
}

impl SharedMem {
    pub(crate) fn new(words: usize) -> Self {
        SharedMem {
            words: zeroed_words(words),
        }
    }

    /// Number of words in the arena.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the arena holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Reads the word at `idx`.
    ///
    /// # Panics
    /// Panics if `idx` is out of range (kernel fault).
    pub fn load(&self, idx: usize) -> f32 {
        self.words[idx].load()
    }

    /// Writes the word at `idx`.
    ///
    /// # Panics
    /// Panics if `idx` is out of range (kernel fault).
    pub fn store(&self, idx: usize, value: f32) {
        self.words[idx].store(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_on_creation() {
        let shared = SharedMem::new(8);
        assert_eq!(shared.len(), 8);
        assert!((0..8).all(|i| shared.load(i) == 0.0));
    }

    #[test]
    fn test_store_load() {
        let shared = SharedMem::new(4);
        shared.store(3, 2.5);
        assert_eq!(shared.load(3), 2.5);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        let shared = SharedMem::new(2);
        shared.load(2);
    }
}
