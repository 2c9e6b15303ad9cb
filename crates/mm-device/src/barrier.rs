use std::sync::{Condvar, Mutex};

/// A block-scoped synchronization barrier with poisoning.
///
/// All `participants` threads of a block must call [`wait`](Self::wait) for
/// any of them to proceed; the barrier is reusable across phases. If one
/// thread of the block dies, the launcher poisons the barrier so that every
/// surviving thread unwinds out of its next `wait` instead of blocking
/// forever on a peer that will never arrive.
#[derive(Debug)]
pub struct BlockBarrier {
    state: Mutex<BarrierState>,
    cvar: Condvar,
    participants: usize,
}

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

impl BlockBarrier {
    pub fn new(participants: usize) -> Self {
        BlockBarrier {
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                poisoned: false,
            }),
            cvar: Condvar::new(),
            participants,
        }
    }

    /// Blocks until every participant has arrived at this generation.
    ///
    /// # Panics
    /// Panics if the barrier has been poisoned; the panic unwinds the
    /// calling kernel thread so the whole block aborts.
    pub fn wait(&self) {
        let mut state = self.state.lock().expect("barrier mutex poisoned");
        if state.poisoned {
            drop(state);
            panic!("block barrier poisoned");
        }

        state.arrived += 1;
        if state.arrived == self.participants {
            state.arrived = 0;
            state.generation += 1;
            self.cvar.notify_all();
            return;
        }

        let generation = state.generation;
        while state.generation == generation && !state.poisoned {
            state = self
                .cvar
                .wait(state)
                .expect("barrier mutex poisoned");
        }
        let poisoned = state.poisoned;
        drop(state);
        if poisoned {
            panic!("block barrier poisoned");
        }
    }

    /// Marks the barrier as poisoned and wakes every waiter.
    pub fn poison(&self) {
        let mut state = self.state.lock().expect("barrier mutex poisoned");
        state.poisoned = true;
        self.cvar.notify_all();
    }
}
