use crate::grid::{CellCoord, Grid};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{debug, trace};

/// Ordered cells from an agent's start (exclusive) to its goal (inclusive),
/// with a cursor marking the next cell to reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    cells: Vec<CellCoord>,
    cursor: usize,
}

impl Path {
    pub fn new(cells: Vec<CellCoord>) -> Self {
        Path { cells, cursor: 0 }
    }

    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Next uncompleted cell, `None` once the path is consumed
    pub fn current(&self) -> Option<CellCoord> {
        self.cells.get(self.cursor).copied()
    }

    /// Cells not yet reached
    pub fn remaining(&self) -> &[CellCoord] {
        &self.cells[self.cursor.min(self.cells.len())..]
    }

    pub fn advance(&mut self) {
        if self.cursor < self.cells.len() {
            self.cursor += 1;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.cells.len()
    }

    pub fn goal(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }
}

/// A node in the open set
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    cell: CellCoord,
    g: i32,
    f: i32,
    /// Insertion sequence, lower pops first among equal `f`
    seq: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Manhattan distance heuristic
pub fn heuristic(a: CellCoord, b: CellCoord) -> i32 {
    a.manhattan(&b)
}

/// Shortest 4-connected path from `start` to `goal` using A*.
///
/// Returns `None` when the goal cannot be reached. A goal equal to the start
/// yields an empty path.
pub fn find_path(grid: &Grid, start: CellCoord, goal: CellCoord) -> Option<Path> {
    if !grid.is_walkable(goal) {
        debug!(?start, ?goal, "goal is not walkable");
        return None;
    }

    let mut open: BinaryHeap<OpenNode> = BinaryHeap::new();
    let mut closed: HashSet<CellCoord> = HashSet::new();
    let mut g_score: HashMap<CellCoord, i32> = HashMap::new();
    let mut came_from: HashMap<CellCoord, CellCoord> = HashMap::new();
    let mut seq = 0u64;

    g_score.insert(start, 0);
    open.push(OpenNode {
        cell: start,
        g: 0,
        f: heuristic(start, goal),
        seq,
    });

    let mut expanded = 0usize;
    while let Some(node) = open.pop() {
        if node.cell == goal {
            let path = reconstruct(&came_from, start, goal);
            debug!(
                ?start,
                ?goal,
                steps = path.len(),
                expanded,
                "path found"
            );
            return Some(Path::new(path));
        }

        // Stale entry superseded by a cheaper push
        if !closed.insert(node.cell) {
            continue;
        }
        expanded += 1;
        trace!(cell = ?node.cell, g = node.g, f = node.f, "expanding");

        for next in grid.neighbors(node.cell) {
            if closed.contains(&next) {
                continue;
            }

            let tentative = node.g + 1;
            let improves = match g_score.get(&next) {
                Some(&best) => tentative < best,
                None => true,
            };

            if improves {
                came_from.insert(next, node.cell);
                g_score.insert(next, tentative);
                seq += 1;
                open.push(OpenNode {
                    cell: next,
                    g: tentative,
                    f: tentative + heuristic(next, goal),
                    seq,
                });
            }
        }
    }

    debug!(?start, ?goal, expanded, "no path");
    None
}

/// Walk parent links back from the goal; the start cell is excluded
fn reconstruct(
    came_from: &HashMap<CellCoord, CellCoord>,
    start: CellCoord,
    goal: CellCoord,
) -> Vec<CellCoord> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        match came_from.get(&current) {
            Some(&parent) => current = parent,
            None => break,
        }
    }
    path.reverse();
    path
}

/// Format path for display
pub fn format_path(path: &[CellCoord]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    let mut result = String::new();
    for (i, pos) in path.iter().enumerate() {
        if i > 0 {
            result.push_str(" -> ");
        }
        result.push_str(&format!("({},{})", pos.x, pos.y));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_room(size: usize) -> Grid {
        let mut text = String::new();
        for y in 0..size {
            for x in 0..size {
                let border = x == 0 || y == 0 || x == size - 1 || y == size - 1;
                text.push(if border { '#' } else { '.' });
            }
            text.push('\n');
        }
        Grid::parse(&text, 20.0).unwrap()
    }

    #[test]
    fn test_open_node_ordering() {
        let mut heap = BinaryHeap::new();
        let cell = CellCoord::new(0, 0);
        heap.push(OpenNode { cell, g: 0, f: 5, seq: 2 });
        heap.push(OpenNode { cell, g: 0, f: 3, seq: 3 });
        heap.push(OpenNode { cell, g: 0, f: 5, seq: 1 });

        assert_eq!(heap.pop().map(|n| n.seq), Some(3));
        assert_eq!(heap.pop().map(|n| n.seq), Some(1));
        assert_eq!(heap.pop().map(|n| n.seq), Some(2));
    }

    #[test]
    fn test_straight_line() {
        let grid = open_room(6);
        let path = find_path(&grid, CellCoord::new(1, 1), CellCoord::new(4, 1)).unwrap();
        assert_eq!(
            path.cells(),
            &[CellCoord::new(2, 1), CellCoord::new(3, 1), CellCoord::new(4, 1)]
        );
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = open_room(5);
        let path = find_path(&grid, CellCoord::new(2, 2), CellCoord::new(2, 2)).unwrap();
        assert!(path.is_empty());
        assert!(path.is_finished());
    }

    #[test]
    fn test_wall_goal_unreachable() {
        let grid = open_room(5);
        assert!(find_path(&grid, CellCoord::new(1, 1), CellCoord::new(0, 0)).is_none());
        assert!(find_path(&grid, CellCoord::new(1, 1), CellCoord::new(9, 9)).is_none());
    }

    #[test]
    fn test_path_cursor() {
        let mut path = Path::new(vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]);
        assert_eq!(path.current(), Some(CellCoord::new(1, 0)));
        path.advance();
        assert_eq!(path.remaining(), &[CellCoord::new(2, 0)]);
        path.advance();
        path.advance();
        assert!(path.is_finished());
        assert_eq!(path.current(), None);
        assert!(path.remaining().is_empty());
        assert_eq!(path.goal(), Some(CellCoord::new(2, 0)));
    }

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(&[]), "No path");
        assert_eq!(
            format_path(&[CellCoord::new(1, 2), CellCoord::new(1, 3)]),
            "(1,2) -> (1,3)"
        );
    }
}
