use mm_device::{DeviceBuffer, Kernel, SharedMem, ThreadCtx};

/// A `tile x tile` window into the block's shared arena, addressed by
/// (row, col) within the tile.
struct Tile<'a> {
    shared: &'a SharedMem,
    base: usize,
    width: usize,
}

impl<'a> Tile<'a> {
    fn new(shared: &'a SharedMem, base: usize, width: usize) -> Self {
        Tile {
            shared,
            base,
            width,
        }
    }

    fn get(&self, r: usize, c: usize) -> f32 {
        self.shared.load(self.base + r * self.width + c)
    }

    fn set(&self, r: usize, c: usize, value: f32) {
        self.shared.store(self.base + r * self.width + c, value);
    }
}

/// The tiled multiply kernel: one thread per output element of C = A @ B.
///
/// The k dimension is processed in `tile`-wide chunks. For each chunk the
/// block cooperatively stages one sub-tile of A and one of B into shared
/// memory (one element per thread, zero-padded past the true matrix
/// bounds), synchronizes, accumulates the partial dot product out of the
/// staged tiles, and synchronizes again before the next chunk overwrites
/// them.
///
/// Threads whose output coordinate falls outside C still stage, sync, and
/// accumulate on every chunk - the barrier needs the whole block - and only
/// skip the final write. The write guard is a disjunction: the element is
/// committed only when both the row and the column are in range.
///
/// Requires `2 * tile * tile` shared words: the A tile at offset 0, the B
/// tile right after it.
pub(crate) struct TiledMatmulKernel<'a> {
    pub a: &'a DeviceBuffer,
    pub b: &'a DeviceBuffer,
    pub c: &'a DeviceBuffer,
    pub m: usize,
    pub k: usize,
    pub n: usize,
    pub tile: usize,
}

impl TiledMatmulKernel<'_> {
    pub fn shared_words(&self) -> usize {
        2 * self.tile * self.tile
    }
}

impl Kernel for TiledMatmulKernel<'_> {
    fn run(&self, ctx: &ThreadCtx<'_>) {
        let t = self.tile;
        let tx = ctx.thread_idx().x;
        let ty = ctx.thread_idx().y;
        let row = ctx.global_x();
        let col = ctx.global_y();

        let tile_a = Tile::new(ctx.shared(), 0, t);
        let tile_b = Tile::new(ctx.shared(), t * t, t);

        // Partial dot product, carried across chunks.
        let mut acc = 0.0f32;

        for chunk in 0..self.k.div_ceil(t) {
            let a_col = chunk * t + ty;
            let b_row = chunk * t + tx;

            // Stage one element of each input tile, zero past the edges so
            // the compute loop needs no bounds checks.
            let a_val = if row < self.m && a_col < self.k {
                self.a.load(row * self.k + a_col)
            } else {
                0.0
            };
            let b_val = if b_row < self.k && col < self.n {
                self.b.load(b_row * self.n + col)
            } else {
                0.0
            };
            tile_a.set(tx, ty, a_val);
            tile_b.set(tx, ty, b_val);

            // Tiles are complete only once the whole block has staged.
            ctx.sync();

            for j in 0..t {
                acc += tile_a.get(tx, j) * tile_b.get(j, ty);
            }

            // Hold the next chunk's staging until the block is done reading.
            ctx.sync();
        }

        if row < self.m && col < self.n {
            self.c.store(row * self.n + col, acc);
        }
    }
}
