/// Row-major index for in-bounds cells.
#[inline(always)]
pub const fn idx(x: usize, y: usize, width: usize) -> usize {
    y * width + x
}

/// Per-grid cell metadata: `(1/W, 1/H, W, H)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexelSize {
    pub x: f64,
    pub y: f64,
    pub width: usize,
    pub height: usize,
}

impl TexelSize {
    pub fn new(width: usize, height: usize) -> Self {
        let inv = |n: usize| if n == 0 { 0.0 } else { 1.0 / n as f64 };
        Self { x: inv(width), y: inv(height), width, height }
    }
}

/// A `width x height` grid storing `channels` interleaved values per cell.
/// Row 0 is the bottom of the domain (texcoord y = 0).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f64>,
}

impl Grid {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self { width, height, channels, data: vec![0.0; width * height * channels] }
    }

    pub fn filled(width: usize, height: usize, value: &[f64]) -> Self {
        let mut grid = Self::new(width, height, value.len());
        for cell in grid.data.chunks_exact_mut(value.len()) {
            cell.copy_from_slice(value);
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(width, height, channels)`, used for binding checks.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.channels)
    }

    pub fn texel_size(&self) -> TexelSize {
        TexelSize::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn cell(&self, x: usize, y: usize) -> &[f64] {
        let start = idx(x, y, self.width) * self.channels;
        &self.data[start..start + self.channels]
    }

    pub fn cell_mut(&mut self, x: usize, y: usize) -> &mut [f64] {
        let start = idx(x, y, self.width) * self.channels;
        &mut self.data[start..start + self.channels]
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> f64 {
        self.data[idx(x, y, self.width) * self.channels + c]
    }

    /// Neighbor lookup clamped to the grid edge.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize, c: usize) -> f64 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.get(x, y, c)
    }

    /// Bilinear sample at normalized texcoord `(u, v)` with clamp-to-edge.
    /// Cell centers sit at `((i + 0.5) / W, (j + 0.5) / H)`.
    pub fn sample(&self, u: f64, v: f64, c: usize) -> f64 {
        let gx = (u * self.width as f64 - 0.5).clamp(0.0, (self.width - 1) as f64);
        let gy = (v * self.height as f64 - 0.5).clamp(0.0, (self.height - 1) as f64);
        let i0 = gx.floor() as usize;
        let j0 = gy.floor() as usize;
        let i1 = (i0 + 1).min(self.width - 1);
        let j1 = (j0 + 1).min(self.height - 1);
        let s1 = gx - i0 as f64;
        let s0 = 1.0 - s1;
        let t1 = gy - j0 as f64;
        let t0 = 1.0 - t1;
        s0 * (t0 * self.get(i0, j0, c) + t1 * self.get(i0, j1, c))
            + s1 * (t0 * self.get(i1, j0, c) + t1 * self.get(i1, j1, c))
    }

    /// Texcoord of the center of cell `(x, y)`.
    #[inline]
    pub fn texcoord(&self, x: usize, y: usize) -> (f64, f64) {
        ((x as f64 + 0.5) / self.width as f64, (y as f64 + 0.5) / self.height as f64)
    }

    /// Bilinearly resample this grid's contents onto a new `width x height` grid.
    pub fn resampled(&self, width: usize, height: usize) -> Grid {
        let mut out = Grid::new(width, height, self.channels);
        if self.is_empty() {
            return out;
        }
        for y in 0..height {
            for x in 0..width {
                let (u, v) = out.texcoord(x, y);
                for c in 0..self.channels {
                    let value = self.sample(u, v, c);
                    out.cell_mut(x, y)[c] = value;
                }
            }
        }
        out
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// Sum of absolute values over every channel. Used for diagnostics.
    pub fn total_abs(&self) -> f64 {
        self.data.iter().map(|v| v.abs()).sum()
    }

    /// Drop the storage. Idempotent.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.width = 0;
        self.height = 0;
    }
}

/// A pair of grids with interchangeable read/write roles.
#[derive(Debug)]
pub struct DoubleBuffer {
    buffers: [Grid; 2],
    read: usize,
    texel: TexelSize,
}

impl DoubleBuffer {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            buffers: [Grid::new(width, height, channels), Grid::new(width, height, channels)],
            read: 0,
            texel: TexelSize::new(width, height),
        }
    }

    /// Wrap an initial grid; the write side starts as a copy of it.
    pub fn from_grid(grid: Grid) -> Self {
        let texel = grid.texel_size();
        Self { buffers: [grid.clone(), grid], read: 0, texel }
    }

    pub fn read(&self) -> &Grid {
        &self.buffers[self.read]
    }

    pub fn write(&self) -> &Grid {
        &self.buffers[1 - self.read]
    }

    pub fn read_mut(&mut self) -> &mut Grid {
        &mut self.buffers[self.read]
    }

    /// Borrow the read side immutably and the write side mutably at once.
    pub fn split(&mut self) -> (&Grid, &mut Grid) {
        let [a, b] = &mut self.buffers;
        if self.read == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    pub fn swap(&mut self) {
        self.read = 1 - self.read;
    }

    pub fn texel_size(&self) -> TexelSize {
        self.texel
    }

    pub fn width(&self) -> usize {
        self.texel.width
    }

    pub fn height(&self) -> usize {
        self.texel.height
    }

    /// Reallocate at the new dimensions, carrying the read contents over
    /// by bilinear resampling. No-op when the size is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.texel.width && height == self.texel.height {
            return;
        }
        let resampled = self.read().resampled(width, height);
        self.buffers = [resampled.clone(), resampled];
        self.read = 0;
        self.texel = TexelSize::new(width, height);
    }

    /// Release both storages. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        for buffer in self.buffers.iter_mut() {
            buffer.release();
        }
        self.texel = TexelSize::new(0, 0);
    }

    pub fn is_disposed(&self) -> bool {
        self.buffers.iter().all(Grid::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texel_size() {
        let grid = Grid::new(128, 64, 1);
        let t = grid.texel_size();
        assert_eq!(t.width, 128);
        assert_eq!(t.height, 64);
        assert!((t.x - 1.0 / 128.0).abs() < 1e-15);
        assert!((t.y - 1.0 / 64.0).abs() < 1e-15);
    }

    #[test]
    fn test_get_clamped_edges() {
        let mut grid = Grid::new(4, 3, 1);
        grid.cell_mut(0, 0)[0] = 7.0;
        grid.cell_mut(3, 2)[0] = 9.0;
        assert_eq!(grid.get_clamped(-1, -5, 0), 7.0);
        assert_eq!(grid.get_clamped(10, 10, 0), 9.0);
    }

    #[test]
    fn test_sample_at_cell_center_is_exact() {
        let mut grid = Grid::new(5, 5, 2);
        for y in 0..5 {
            for x in 0..5 {
                let cell = grid.cell_mut(x, y);
                cell[0] = x as f64;
                cell[1] = (y * 10) as f64;
            }
        }
        let (u, v) = grid.texcoord(3, 1);
        assert!((grid.sample(u, v, 0) - 3.0).abs() < 1e-12);
        assert!((grid.sample(u, v, 1) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_interpolates_between_cells() {
        let mut grid = Grid::new(2, 1, 1);
        grid.cell_mut(0, 0)[0] = 0.0;
        grid.cell_mut(1, 0)[0] = 1.0;
        // Halfway between the two cell centers.
        assert!((grid.sample(0.5, 0.5, 0) - 0.5).abs() < 1e-12);
        // Past the last center clamps.
        assert!((grid.sample(1.5, 0.5, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_swap_parity() {
        let mut buf = DoubleBuffer::new(4, 4, 1);
        let r0 = buf.read() as *const Grid;
        let w0 = buf.write() as *const Grid;
        assert!(!std::ptr::eq(r0, w0));

        buf.swap();
        assert!(std::ptr::eq(buf.read(), w0));
        assert!(std::ptr::eq(buf.write(), r0));

        buf.swap();
        assert!(std::ptr::eq(buf.read(), r0));
        assert!(std::ptr::eq(buf.write(), w0));

        for _ in 0..7 {
            buf.swap();
        }
        assert!(std::ptr::eq(buf.read(), w0));
    }

    #[test]
    fn test_split_targets_write_side() {
        let mut buf = DoubleBuffer::new(2, 2, 1);
        {
            let (src, dst) = buf.split();
            assert_eq!(src.get(0, 0, 0), 0.0);
            dst.fill(3.0);
        }
        assert_eq!(buf.read().get(0, 0, 0), 0.0);
        buf.swap();
        assert_eq!(buf.read().get(1, 1, 0), 3.0);
    }

    #[test]
    fn test_resize_preserves_uniform_content() {
        let mut buf = DoubleBuffer::from_grid(Grid::filled(8, 8, &[0.25, -1.0]));
        buf.resize(13, 5);
        assert_eq!(buf.width(), 13);
        assert_eq!(buf.height(), 5);
        assert_eq!(buf.texel_size(), TexelSize::new(13, 5));
        for y in 0..5 {
            for x in 0..13 {
                let cell = buf.read().cell(x, y);
                assert!((cell[0] - 0.25).abs() < 1e-12);
                assert!((cell[1] + 1.0).abs() < 1e-12);
            }
        }
        assert_eq!(buf.write().shape(), (13, 5, 2));
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let mut buf = DoubleBuffer::new(4, 4, 1);
        buf.read_mut().fill(2.0);
        buf.swap();
        let before = buf.read() as *const Grid;
        buf.resize(4, 4);
        assert!(std::ptr::eq(buf.read(), before));
    }

    #[test]
    fn test_resize_keeps_gradient_shape() {
        let mut grid = Grid::new(16, 1, 1);
        for x in 0..16 {
            grid.cell_mut(x, 0)[0] = x as f64 / 15.0;
        }
        let mut buf = DoubleBuffer::from_grid(grid);
        buf.resize(32, 1);
        let read = buf.read();
        for x in 1..32 {
            assert!(read.get(x, 0, 0) >= read.get(x - 1, 0, 0), "resampled ramp should stay monotonic");
        }
    }

    #[test]
    fn test_dispose_idempotent() {
        let mut buf = DoubleBuffer::new(4, 4, 3);
        assert!(!buf.is_disposed());
        buf.dispose();
        assert!(buf.is_disposed());
        buf.dispose();
        assert!(buf.is_disposed());
        assert_eq!(buf.width(), 0);
    }
}
