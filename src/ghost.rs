//! Ghost direction choice.
//!
//! Each ghost keeps cruising in its current direction until its decision
//! interval elapses or the way ahead is blocked; only then does it pick a new
//! direction according to its behavior.

use crate::actor::{Agent, Behavior, GhostMind};
use crate::config::GhostsConfig;
use crate::direction::{Direction, CARDINALS};
use crate::grid::{CellCoord, Grid};
use crate::motion::can_move;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

/// How far ahead of the player an Ambusher aims, in cells
pub const AMBUSH_LOOKAHEAD: i32 = 4;

/// Per-axis distance (in cells) at which a Patroller moves on to its next waypoint
const PATROL_REACHED: i32 = 2;

/// Cardinal directions the ghost can legally take right now, in `CARDINALS` order
pub fn possible_directions(grid: &Grid, ghost: &Agent) -> Vec<Direction> {
    CARDINALS
        .into_iter()
        .filter(|&dir| can_move(grid, ghost, dir))
        .collect()
}

/// Corner waypoints visited by Patrollers, in cycle order
pub fn patrol_waypoints(grid: &Grid) -> [CellCoord; 4] {
    [
        CellCoord::new(2, 2),
        CellCoord::new(grid.cols - 3, 2),
        CellCoord::new(grid.cols - 3, grid.rows - 3),
        CellCoord::new(2, grid.rows - 3),
    ]
}

/// Cell the Ambusher aims for: `lookahead` cells ahead of the player along its
/// current direction. Not clamped to the grid.
pub fn ambush_target(grid: &Grid, player: &Agent, lookahead: i32) -> CellCoord {
    let cell = player.cell(grid);
    let (dx, dy) = player.direction.delta();
    CellCoord::new(cell.x + dx * lookahead, cell.y + dy * lookahead)
}

/// Among `possible`, the direction whose one-cell-ahead probe point lies
/// closest to (tx, ty). Starts from `current`; earlier directions win ties.
fn closest_direction(
    grid: &Grid,
    ghost: &Agent,
    possible: &[Direction],
    current: Direction,
    tx: f32,
    ty: f32,
) -> Direction {
    let mut best = current;
    let mut min_distance = f32::INFINITY;

    for &dir in possible {
        let (dx, dy) = dir.scaled(grid.cell_size);
        let px = ghost.x + dx - tx;
        let py = ghost.y + dy - ty;
        let distance = (px * px + py * py).sqrt();

        if distance < min_distance {
            min_distance = distance;
            best = dir;
        }
    }

    best
}

/// Advance the patrol waypoint if the ghost is close to it, returning the
/// waypoint to steer for
fn patrol_target(grid: &Grid, ghost_cell: CellCoord, mind: &mut GhostMind) -> CellCoord {
    let waypoints = patrol_waypoints(grid);
    let reached = |index: usize| {
        let target = waypoints[index];
        (ghost_cell.x - target.x).abs() < PATROL_REACHED
            && (ghost_cell.y - target.y).abs() < PATROL_REACHED
    };

    let index = match mind.patrol_target {
        None => 0,
        Some(index) if reached(index) => (index + 1) % waypoints.len(),
        Some(index) => index,
    };
    if mind.patrol_target != Some(index) {
        debug!(waypoint = ?waypoints[index], "patrol target changed");
    }
    mind.patrol_target = Some(index);
    waypoints[index]
}

/// Should the ghost keep its current direction this tick
fn is_cruising(grid: &Grid, ghost: &Agent, mind: &GhostMind, now: f64) -> bool {
    let within_interval = match mind.last_decision_at {
        Some(last) => now - last < mind.decision_interval,
        None => false,
    };
    within_interval && can_move(grid, ghost, ghost.direction)
}

/// Choose the ghost's direction for this tick and store it on the ghost.
///
/// Players are returned unchanged. `now` is the simulation clock in seconds.
pub fn decide<R: Rng + ?Sized>(
    grid: &Grid,
    ghost: &mut Agent,
    player: &Agent,
    now: f64,
    rng: &mut R,
) -> Direction {
    let current = ghost.direction;
    let ghost_cell = ghost.cell(grid);
    let possible = possible_directions(grid, ghost);

    let Some(mind) = ghost.mind() else {
        return current;
    };
    if is_cruising(grid, ghost, mind, now) {
        return current;
    }
    let behavior = mind.behavior();

    // Boxed in: reversing is the only way out
    if possible.is_empty() {
        let reversed = current.opposite();
        trace!(?behavior, from = ?current, to = ?reversed, "ghost reversing");
        if let Some(mind) = ghost.mind_mut() {
            mind.last_decision_at = Some(now);
        }
        ghost.direction = reversed;
        return reversed;
    }

    let chosen = match behavior {
        Behavior::Chaser => {
            closest_direction(grid, ghost, &possible, current, player.x, player.y)
        }
        Behavior::Ambusher => {
            let target = ambush_target(grid, player, AMBUSH_LOOKAHEAD);
            let (tx, ty) = (
                target.x as f32 * grid.cell_size,
                target.y as f32 * grid.cell_size,
            );
            closest_direction(grid, ghost, &possible, current, tx, ty)
        }
        Behavior::Patroller => {
            let target = match ghost.mind_mut() {
                Some(mind) => patrol_target(grid, ghost_cell, mind),
                None => return current,
            };
            let (tx, ty) = (
                target.x as f32 * grid.cell_size,
                target.y as f32 * grid.cell_size,
            );
            closest_direction(grid, ghost, &possible, current, tx, ty)
        }
        Behavior::Random => possible.choose(rng).copied().unwrap_or(current),
    };

    if let Some(mind) = ghost.mind_mut() {
        mind.last_decision_at = Some(now);
    }

    let direction = if can_move(grid, ghost, chosen) {
        chosen
    } else if can_move(grid, ghost, current) {
        current
    } else {
        possible.choose(rng).copied().unwrap_or(current)
    };

    trace!(?behavior, from = ?current, to = ?direction, "ghost decided");
    ghost.direction = direction;
    direction
}

/// Create up to four ghosts on the grid's spawn cells.
///
/// Behaviors follow spawn order (Chaser, Ambusher, Random, Patroller). Each
/// ghost gets a random decision interval and a random starting direction.
pub fn spawn_ghosts<R: Rng + ?Sized>(
    grid: &Grid,
    count: usize,
    config: &GhostsConfig,
    rng: &mut R,
) -> Vec<Agent> {
    let spawns = grid.spawn_cells();
    let count = count.min(Behavior::SPAWN_ORDER.len()).min(spawns.len());

    let (low, high) = if config.min_decision_interval <= config.max_decision_interval {
        (config.min_decision_interval, config.max_decision_interval)
    } else {
        (config.max_decision_interval, config.min_decision_interval)
    };

    (0..count)
        .map(|i| {
            let interval = if high > low { rng.gen_range(low..high) } else { low };
            let direction = CARDINALS.choose(rng).copied().unwrap_or(Direction::Up);
            let mind = GhostMind::new(Behavior::SPAWN_ORDER[i], interval);
            debug!(behavior = ?mind.behavior(), cell = ?spawns[i], interval, "ghost spawned");
            Agent::ghost_at(grid, spawns[i], mind, config.radius, config.speed, direction)
        })
        .collect()
}
