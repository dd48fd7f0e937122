#![allow(dead_code)]

use mazechase::{CellCoord, CellMarker, Grid};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;

pub const CELL_SIZE: f32 = 20.0;

/// Square grid of side `n`: open inside, wall border
pub fn bordered_grid(n: usize) -> Grid {
    let markers = (0..n)
        .map(|y| {
            (0..n)
                .map(|x| {
                    if x == 0 || y == 0 || x == n - 1 || y == n - 1 {
                        CellMarker::Wall
                    } else {
                        CellMarker::Open
                    }
                })
                .collect()
        })
        .collect();
    Grid::load(markers, CELL_SIZE).unwrap()
}

pub fn parse(layout: &str) -> Grid {
    Grid::parse(layout, CELL_SIZE).unwrap()
}

/// Bordered grid with interior walls sprinkled at `density`
pub fn random_grid(n: usize, density: f64, rng: &mut StdRng) -> Grid {
    let markers = (0..n)
        .map(|y| {
            (0..n)
                .map(|x| {
                    let border = x == 0 || y == 0 || x == n - 1 || y == n - 1;
                    if border || rng.gen_bool(density) {
                        CellMarker::Wall
                    } else {
                        CellMarker::Open
                    }
                })
                .collect()
        })
        .collect();
    Grid::load(markers, CELL_SIZE).unwrap()
}

/// Reference step count from BFS over walkable cells
pub fn bfs_distance(grid: &Grid, start: CellCoord, goal: CellCoord) -> Option<usize> {
    let mut dist = vec![usize::MAX; (grid.rows * grid.cols) as usize];
    let mut queue = VecDeque::new();
    dist[grid.get_id(start.x, start.y) as usize] = 0;
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        let d = dist[grid.get_id(cell.x, cell.y) as usize];
        if cell == goal {
            return Some(d);
        }
        for next in grid.neighbors(cell) {
            let id = grid.get_id(next.x, next.y) as usize;
            if dist[id] == usize::MAX {
                dist[id] = d + 1;
                queue.push_back(next);
            }
        }
    }
    None
}

/// Render a path over the grid for test output
pub fn visualize_path(grid: &Grid, path: &[CellCoord], start: CellCoord) -> String {
    let mut result = String::new();
    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let cell = CellCoord::new(x, y);
            let symbol = if cell == start {
                'S'
            } else if path.last() == Some(&cell) {
                'D'
            } else if path.contains(&cell) {
                '*'
            } else {
                grid.marker(cell).to_char()
            };
            result.push(symbol);
        }
        result.push('\n');
    }
    result
}
