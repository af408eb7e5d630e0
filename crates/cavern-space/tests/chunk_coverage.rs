//! Chunk partitioning covers every cell exactly once.

use cavern_core::Coord;
use cavern_space::{build_chunks, prioritize, ChunkScheduler, Viewport};
use cavern_test_utils::strategies::arb_grid;
use proptest::prelude::*;

proptest! {
    #[test]
    fn chunks_cover_each_cell_once(grid in arb_grid(40), size in 1u32..12) {
        let chunks = build_chunks(&grid, size).unwrap();
        let mut hits = vec![0u8; grid.cell_count()];
        for chunk in &chunks {
            prop_assert!(chunk.bounds.width <= size && chunk.bounds.height <= size);
            prop_assert_eq!(chunk.cells.len(), chunk.bounds.area());
            for coord in chunk.bounds.coords() {
                let index = grid.index_of(coord).unwrap();
                hits[index] += 1;
                prop_assert_eq!(chunk.cell(coord), grid.get(coord));
            }
        }
        prop_assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn prioritize_is_a_descending_permutation(
        grid in arb_grid(32),
        size in 1u32..9,
        vx in 0.0f64..32.0,
        vy in 0.0f64..32.0,
    ) {
        let chunks = build_chunks(&grid, size).unwrap();
        let count = chunks.len();
        let ordered = prioritize(chunks, &Viewport::new(vx, vy, 4.0, 4.0));
        prop_assert_eq!(ordered.len(), count);
        for pair in ordered.windows(2) {
            prop_assert!(pair[0].priority >= pair[1].priority);
        }
        for chunk in &ordered {
            prop_assert!(chunk.priority > 0.0 && chunk.priority <= 1.0);
        }
    }
}

#[test]
fn scheduler_keeps_coverage_after_reordering() {
    let grid = cavern_test_utils::GridBuilder::new(25, 13).build();
    let mut scheduler = ChunkScheduler::new(&grid, 6).unwrap();
    scheduler.set_viewport(Viewport::new(18.0, 6.0, 6.0, 6.0));
    let total: usize = scheduler.chunks().iter().map(|c| c.cells.len()).sum();
    assert_eq!(total, 25 * 13);
    assert!(scheduler.covering(Coord::new(24, 12)).is_some());
    assert_eq!(scheduler.chunks()[0].bounds.x, 18);
}
