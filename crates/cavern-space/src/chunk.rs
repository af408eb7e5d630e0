//! Chunk partitioning and viewport prioritization.
//!
//! [`build_chunks`] tiles a grid into `ceil(w / size) x ceil(h / size)`
//! rectangles, the last row and column possibly narrower. [`prioritize`]
//! scores each chunk with `1 / (1 + d)` where `d` is the distance between
//! the chunk center and the viewport center, then sorts descending.
//!
//! Re-prioritizing on every viewport change is a linear rescan over the
//! chunks. At a few thousand chunks that is cheap enough to run on the
//! calling thread, which is what [`ChunkScheduler::set_viewport`] does.

use cavern_core::{Cell, Coord, LevelGrid};
use serde::Serialize;

use crate::error::ChunkError;
use crate::region::{Rect, Viewport};

/// A rectangular window of a grid together with a copy of its cells.
///
/// Chunks never borrow or mutate the source grid. `priority` is zero
/// until a viewport has been applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chunk {
    /// Covered rectangle in grid coordinates.
    pub bounds: Rect,
    /// Covered cells, row-major within `bounds`.
    pub cells: Vec<Cell>,
    /// Viewport priority in `(0, 1]`, higher first.
    pub priority: f64,
}

impl Chunk {
    /// Cell at a grid coordinate inside this chunk.
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        if !self.bounds.contains(coord) {
            return None;
        }
        let local_x = (coord.x - self.bounds.x) as usize;
        let local_y = (coord.y - self.bounds.y) as usize;
        self.cells.get(local_y * self.bounds.width as usize + local_x)
    }

    fn score(&self, viewport: &Viewport) -> f64 {
        let (cx, cy) = self.bounds.center();
        let (vx, vy) = viewport.center();
        let distance = ((cx - vx).powi(2) + (cy - vy).powi(2)).sqrt();
        1.0 / (1.0 + distance)
    }
}

/// Partition `grid` into chunks of at most `chunk_size x chunk_size` cells.
///
/// Chunks come back in row-major chunk order. Their union covers every
/// cell exactly once.
pub fn build_chunks(grid: &LevelGrid, chunk_size: u32) -> Result<Vec<Chunk>, ChunkError> {
    if chunk_size == 0 {
        return Err(ChunkError::ZeroChunkSize);
    }
    grid.ensure_well_formed()?;

    let width = grid.width();
    let height = grid.height();
    let cols = width.div_ceil(chunk_size);
    let rows = height.div_ceil(chunk_size);
    let cells = grid.cells();

    let mut chunks = Vec::with_capacity((cols as usize) * (rows as usize));
    for row in 0..rows {
        let y = row * chunk_size;
        let h = chunk_size.min(height - y);
        for col in 0..cols {
            let x = col * chunk_size;
            let w = chunk_size.min(width - x);
            let bounds = Rect::new(x, y, w, h);

            let mut chunk_cells = Vec::with_capacity(bounds.area());
            for cy in y..y + h {
                let start = (cy as usize) * (width as usize) + x as usize;
                chunk_cells.extend_from_slice(&cells[start..start + w as usize]);
            }

            chunks.push(Chunk {
                bounds,
                cells: chunk_cells,
                priority: 0.0,
            });
        }
    }
    Ok(chunks)
}

/// Score `chunks` against `viewport` and sort them closest-first.
///
/// The sort is stable, so chunks at equal distance keep their input order.
pub fn prioritize(mut chunks: Vec<Chunk>, viewport: &Viewport) -> Vec<Chunk> {
    prioritize_in_place(&mut chunks, viewport);
    chunks
}

fn prioritize_in_place(chunks: &mut [Chunk], viewport: &Viewport) {
    for chunk in chunks.iter_mut() {
        chunk.priority = chunk.score(viewport);
    }
    chunks.sort_by(|a, b| b.priority.total_cmp(&a.priority));
}

/// Holds a grid's chunks and keeps them ordered for the current viewport.
#[derive(Clone, Debug)]
pub struct ChunkScheduler {
    chunk_size: u32,
    chunks: Vec<Chunk>,
    viewport: Option<Viewport>,
}

impl ChunkScheduler {
    /// Partition `grid` into chunks of `chunk_size`.
    pub fn new(grid: &LevelGrid, chunk_size: u32) -> Result<Self, ChunkError> {
        Ok(Self {
            chunk_size,
            chunks: build_chunks(grid, chunk_size)?,
            viewport: None,
        })
    }

    /// Re-score and re-sort for a new viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        prioritize_in_place(&mut self.chunks, &viewport);
        self.viewport = Some(viewport);
    }

    /// Most recently applied viewport.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Chunk edge length.
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Chunks in current priority order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the grid produced no chunks (zero width or height).
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunks overlapping `viewport`, in current priority order.
    pub fn visible<'a>(&'a self, viewport: &'a Viewport) -> impl Iterator<Item = &'a Chunk> + 'a {
        self.chunks
            .iter()
            .filter(move |chunk| viewport.intersects(&chunk.bounds))
    }

    /// The chunk covering `coord`.
    pub fn covering(&self, coord: Coord) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.bounds.contains(coord))
    }

    /// Consume the scheduler, yielding its chunks in priority order.
    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_core::TileId;

    fn numbered(w: u32, h: u32) -> LevelGrid {
        let cells = (0..w * h)
            .map(|i| Cell::new(TileId::GROUND).with_elevation(i))
            .collect();
        LevelGrid::new(w, h, cells).unwrap()
    }

    #[test]
    fn partitions_with_ragged_edges() {
        let grid = numbered(10, 7);
        let chunks = build_chunks(&grid, 4).unwrap();
        assert_eq!(chunks.len(), 3 * 2);
        assert_eq!(chunks[2].bounds, Rect::new(8, 0, 2, 4));
        assert_eq!(chunks[5].bounds, Rect::new(8, 4, 2, 3));
        assert_eq!(chunks[5].cells.len(), 6);
    }

    #[test]
    fn chunk_cells_match_grid() {
        let grid = numbered(10, 7);
        for chunk in build_chunks(&grid, 3).unwrap() {
            for coord in chunk.bounds.coords() {
                assert_eq!(chunk.cell(coord), grid.get(coord));
            }
        }
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let grid = numbered(4, 4);
        assert_eq!(build_chunks(&grid, 0), Err(ChunkError::ZeroChunkSize));
    }

    #[test]
    fn malformed_grid_rejected() {
        let grid = LevelGrid::from_raw(4, 4, vec![Cell::default(); 3]);
        assert!(matches!(build_chunks(&grid, 2), Err(ChunkError::Grid(_))));
    }

    #[test]
    fn prioritize_puts_viewport_chunk_first() {
        let grid = numbered(32, 32);
        let chunks = build_chunks(&grid, 8).unwrap();
        let ordered = prioritize(chunks, &Viewport::new(24.0, 24.0, 8.0, 8.0));
        assert_eq!(ordered[0].bounds, Rect::new(24, 24, 8, 8));
        assert!((ordered[0].priority - 1.0).abs() < 1e-12);
        assert_eq!(ordered.last().unwrap().bounds, Rect::new(0, 0, 8, 8));
        for pair in ordered.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
    }

    #[test]
    fn scheduler_reorders_on_viewport_change() {
        let grid = numbered(16, 16);
        let mut scheduler = ChunkScheduler::new(&grid, 8).unwrap();
        assert_eq!(scheduler.len(), 4);

        scheduler.set_viewport(Viewport::new(0.0, 0.0, 8.0, 8.0));
        assert_eq!(scheduler.chunks()[0].bounds, Rect::new(0, 0, 8, 8));

        scheduler.set_viewport(Viewport::new(8.0, 8.0, 8.0, 8.0));
        assert_eq!(scheduler.chunks()[0].bounds, Rect::new(8, 8, 8, 8));

        let vp = Viewport::new(4.0, 4.0, 2.0, 2.0);
        assert_eq!(scheduler.visible(&vp).count(), 1);
        assert_eq!(
            scheduler.covering(Coord::new(9, 3)).unwrap().bounds,
            Rect::new(8, 0, 8, 8)
        );
    }
}
