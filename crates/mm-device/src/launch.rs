use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread;

use crate::barrier::BlockBarrier;
use crate::device::Device;
use crate::error::{DeviceError, Result};
use crate::grid::{Dim2, LaunchGeometry};
use crate::shared::SharedMem;

/// Hard cap on threads per block, as on real hardware.
pub const MAX_BLOCK_THREADS: usize = 1024;

/// A device kernel: one `run` per thread of the launch.
///
/// Implementations must keep every thread of a block attending every
/// [`ThreadCtx::sync`] call, including threads whose output coordinate is
/// out of bounds; a thread that returns early corrupts the barrier for its
/// block-mates. Panicking inside `run` is a fault that aborts the launch.
pub trait Kernel: Sync {
    fn run(&self, ctx: &ThreadCtx<'_>);
}

/// Per-thread execution context handed to [`Kernel::run`].
#[derive(Debug)]
pub struct ThreadCtx<'a> {
    block_idx: Dim2,
    thread_idx: Dim2,
    geometry: LaunchGeometry,
    shared: &'a SharedMem,
    barrier: &'a BlockBarrier,
}

impl<'a> ThreadCtx<'a> {
    /// This thread's block position within the grid.
    pub fn block_idx(&self) -> Dim2 {
        self.block_idx
    }

    /// This thread's position within its block.
    pub fn thread_idx(&self) -> Dim2 {
        self.thread_idx
    }

    /// The geometry of the whole launch.
    pub fn geometry(&self) -> LaunchGeometry {
        self.geometry
    }

    /// Global x coordinate: `block_idx.x * block.x + thread_idx.x`.
    pub fn global_x(&self) -> usize {
        self.block_idx.x * self.geometry.block.x + self.thread_idx.x
    }

    /// Global y coordinate: `block_idx.y * block.y + thread_idx.y`.
    pub fn global_y(&self) -> usize {
        self.block_idx.y * self.geometry.block.y + self.thread_idx.y
    }

    /// The block's shared memory arena.
    pub fn shared(&self) -> &SharedMem {
        self.shared
    }

    /// Block-wide barrier: no thread proceeds until all have arrived.
    pub fn sync(&self) {
        self.barrier.wait();
    }
}

impl Device {
    /// Dispatches `kernel` over `geometry` and waits for completion.
    ///
    /// Each block gets a fresh `shared_words`-word [`SharedMem`] and runs
    /// its threads concurrently; blocks are independent and carry no
    /// ordering guarantee relative to one another. The call returns only
    /// once every block has finished.
    ///
    /// # Errors
    /// - `InvalidLaunch` for a degenerate geometry or a block larger than
    ///   [`MAX_BLOCK_THREADS`].
    /// - `LaunchFault` if any kernel thread panics (e.g. an out-of-range
    ///   access). The fault aborts the whole launch; the surviving threads
    ///   of the faulted block are unwound through the poisoned barrier, and
    ///   no output written by the launch may be trusted.
    pub fn launch<K: Kernel>(
        &self,
        geometry: LaunchGeometry,
        shared_words: usize,
        kernel: &K,
    ) -> Result<()> {
        if geometry.grid.count() == 0 || geometry.block.count() == 0 {
            return Err(DeviceError::InvalidLaunch(format!(
                "empty grid {} or block {}",
                geometry.grid, geometry.block
            )));
        }
        if geometry.block.count() > MAX_BLOCK_THREADS {
            return Err(DeviceError::InvalidLaunch(format!(
                "block {} exceeds {MAX_BLOCK_THREADS} threads",
                geometry.block
            )));
        }

        for by in 0..geometry.grid.y {
            for bx in 0..geometry.grid.x {
                run_block(geometry, Dim2::new(bx, by), shared_words, kernel)?;
            }
        }
        Ok(())
    }
}

/// Runs one block: a scoped thread per kernel worker, joined before return.
fn run_block<K: Kernel>(
    geometry: LaunchGeometry,
    block_idx: Dim2,
    shared_words: usize,
    kernel: &K,
) -> Result<()> {
    let shared = SharedMem::new(shared_words);
    let barrier = BlockBarrier::new(geometry.block.count());
    let fault: Mutex<Option<String>> = Mutex::new(None);

    thread::scope(|scope| {
        let shared = &shared;
        let barrier = &barrier;
        let fault = &fault;
        for ty in 0..geometry.block.y {
            for tx in 0..geometry.block.x {
                scope.spawn(move || {
                    let ctx = ThreadCtx {
                        block_idx,
                        thread_idx: Dim2::new(tx, ty),
                        geometry,
                        shared,
                        barrier,
                    };
                    if let Err(payload) =
                        catch_unwind(AssertUnwindSafe(|| kernel.run(&ctx)))
                    {
                        let mut slot =
                            fault.lock().unwrap_or_else(|e| e.into_inner());
                        if slot.is_none() {
                            *slot = Some(panic_message(payload.as_ref()));
                        }
                        drop(slot);
                        // Wake block-mates parked at the barrier so the
                        // block unwinds instead of deadlocking.
                        barrier.poison();
                    }
                });
            }
        }
    });

    match fault.into_inner().unwrap_or_else(|e| e.into_inner()) {
        Some(message) => Err(DeviceError::LaunchFault(message)),
        None => Ok(()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "kernel panicked".to_string()
    }
}
