//! Per-tick movement for players and ghosts.
//!
//! Every move is tested against the grid's walls before it is applied, so an
//! agent's box never overlaps a wall cell. Positions are clamped to the maze
//! extent afterwards.

use crate::actor::Agent;
use crate::direction::Direction;
use crate::grid::Grid;
use crate::pathfinding::format_path;
use tracing::{debug, trace};

/// Would a `distance` move in `dir` keep the agent clear of walls
fn can_move_by(grid: &Grid, agent: &Agent, dir: Direction, distance: f32) -> bool {
    if dir == Direction::None {
        return false;
    }
    let (dx, dy) = dir.scaled(distance);
    !grid.collides_with_wall(agent.x + dx, agent.y + dy, agent.radius)
}

/// Can the agent take one full `speed` step in `dir`
pub fn can_move(grid: &Grid, agent: &Agent, dir: Direction) -> bool {
    can_move_by(grid, agent, dir, agent.speed)
}

/// Clamp the agent to `[radius, extent - radius]` on both axes
fn clamp_to_world(grid: &Grid, agent: &mut Agent) {
    agent.x = agent.x.max(agent.radius).min(grid.world_width() - agent.radius);
    agent.y = agent.y.max(agent.radius).min(grid.world_height() - agent.radius);
}

fn apply_move(grid: &Grid, agent: &mut Agent, dir: Direction, distance: f32) {
    let (dx, dy) = dir.scaled(distance);
    agent.x += dx;
    agent.y += dy;
    clamp_to_world(grid, agent);
}

/// Advance an agent one tick along its direction.
///
/// A pending `next_direction` replaces the current direction only when that
/// move is legal. If the current direction is blocked the agent stays put.
pub fn step(grid: &Grid, agent: &mut Agent) -> (f32, f32) {
    let wanted = agent.next_direction;
    if wanted != Direction::None && wanted != agent.direction && can_move(grid, agent, wanted) {
        trace!(from = ?agent.direction, to = ?wanted, "direction committed");
        agent.direction = wanted;
    }

    if can_move(grid, agent, agent.direction) {
        let speed = agent.speed;
        apply_move(grid, agent, agent.direction, speed);
    }

    (agent.x, agent.y)
}

/// Step towards a world point: the direction (dominant axis first) and the
/// distance to move, never past the point on that axis. Falls back to the
/// other axis when the dominant move is blocked and that axis is still off
/// target. Both candidates are tested at the distance they would really move.
fn step_towards(grid: &Grid, agent: &Agent, tx: f32, ty: f32) -> (Direction, f32) {
    let dx = tx - agent.x;
    let dy = ty - agent.y;
    let horizontal = (if dx > 0.0 { Direction::Right } else { Direction::Left }, dx.abs());
    let vertical = (if dy > 0.0 { Direction::Down } else { Direction::Up }, dy.abs());

    let (primary, secondary) = if dx.abs() >= dy.abs() {
        (horizontal, vertical)
    } else {
        (vertical, horizontal)
    };
    let primary = (primary.0, agent.speed.min(primary.1));
    let secondary = (secondary.0, agent.speed.min(secondary.1));

    if can_move_by(grid, agent, primary.0, primary.1) {
        primary
    } else if secondary.1 > f32::EPSILON && can_move_by(grid, agent, secondary.0, secondary.1) {
        secondary
    } else {
        primary
    }
}

/// Advance an agent one tick along its active path.
///
/// Reaching the cursor cell (within one step on both axes) snaps the agent to
/// the cell centre and advances the cursor. The path is dropped once every
/// cell has been reached, leaving the agent idle.
pub fn follow_path(grid: &Grid, agent: &mut Agent) -> (f32, f32) {
    let Some(target) = agent.path.as_ref().and_then(|p| p.current()) else {
        agent.path = None;
        agent.direction = Direction::None;
        return (agent.x, agent.y);
    };

    let (tx, ty) = grid.cell_center(target);
    if (tx - agent.x).abs() <= agent.speed && (ty - agent.y).abs() <= agent.speed {
        agent.x = tx;
        agent.y = ty;
        if let Some(path) = agent.path.as_mut() {
            path.advance();
            if path.is_finished() {
                debug!(goal = ?target, "path complete");
                agent.path = None;
                agent.direction = Direction::None;
            }
        }
        return (agent.x, agent.y);
    }

    let (dir, distance) = step_towards(grid, agent, tx, ty);
    agent.direction = dir;
    agent.next_direction = Direction::None;

    if can_move_by(grid, agent, dir, distance) {
        apply_move(grid, agent, dir, distance);
    } else if let Some(path) = agent.path.as_ref() {
        trace!(remaining = %format_path(path.remaining()), ?dir, "path step blocked");
    }

    (agent.x, agent.y)
}

/// Player update: follow the active path if there is one, otherwise steer by
/// direction input
pub fn update_player(grid: &Grid, agent: &mut Agent) -> (f32, f32) {
    if agent.path.is_some() {
        follow_path(grid, agent)
    } else {
        step(grid, agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::AgentKind;
    use crate::grid::CellCoord;
    use crate::pathfinding::find_path;

    // Corridor along row 1 with a branch going down at column 3
    const LAYOUT: &str = "\
#######
#.....#
###.###
###.###
#######
";

    // Speed larger than the 2px slack between an 8px radius and a 20px cell
    fn player(grid: &Grid, cell: CellCoord) -> Agent {
        Agent::player_at(grid, cell, 8.0, 4.0)
    }

    #[test]
    fn test_step_moves_in_open_direction() {
        let grid = Grid::parse(LAYOUT, 20.0).unwrap();
        let mut agent = player(&grid, CellCoord::new(1, 1));
        agent.next_direction = Direction::Right;

        let (x, y) = step(&grid, &mut agent);
        assert_eq!((x, y), (34.0, 30.0));
        assert_eq!(agent.direction, Direction::Right);
    }

    #[test]
    fn test_step_blocked_turn_is_deferred() {
        let grid = Grid::parse(LAYOUT, 20.0).unwrap();
        let mut agent = player(&grid, CellCoord::new(1, 1));
        agent.direction = Direction::Right;
        agent.next_direction = Direction::Down;

        // Down is walled at column 1, so the agent keeps heading right
        step(&grid, &mut agent);
        assert_eq!(agent.direction, Direction::Right);
        assert_eq!(agent.x, 34.0);

        // Walk until the branch opens, then the pending turn commits
        for _ in 0..100 {
            step(&grid, &mut agent);
            if agent.direction == Direction::Down {
                break;
            }
        }
        assert_eq!(agent.direction, Direction::Down);
        assert_eq!(agent.cell(&grid).x, 3);
    }

    #[test]
    fn test_step_stops_at_wall() {
        let grid = Grid::parse(LAYOUT, 20.0).unwrap();
        let mut agent = player(&grid, CellCoord::new(1, 1));
        agent.direction = Direction::Left;

        let before = (agent.x, agent.y);
        assert_eq!(step(&grid, &mut agent), before);
    }

    #[test]
    fn test_none_direction_does_not_move() {
        let grid = Grid::parse(LAYOUT, 20.0).unwrap();
        let mut agent = player(&grid, CellCoord::new(2, 1));
        assert_eq!(step(&grid, &mut agent), (50.0, 30.0));
        assert!(!can_move(&grid, &agent, Direction::None));
    }

    #[test]
    fn test_clamp_on_open_border() {
        // No border walls: the clamp is the only thing keeping agents inside
        let grid = Grid::parse("...\n...\n", 20.0).unwrap();
        let mut agent = Agent::new(AgentKind::Player, 8.5, 10.0, 8.0, 1.0);
        agent.direction = Direction::Left;
        step(&grid, &mut agent);
        assert_eq!(agent.x, 8.0);
        step(&grid, &mut agent);
        assert_eq!(agent.x, 8.0);
    }

    #[test]
    fn test_follow_path_reaches_goal() {
        let grid = Grid::parse(LAYOUT, 20.0).unwrap();
        let mut agent = player(&grid, CellCoord::new(1, 1));
        let goal = CellCoord::new(3, 3);
        agent.path = find_path(&grid, agent.cell(&grid), goal);
        assert_eq!(agent.path.as_ref().map(|p| p.len()), Some(4));

        for _ in 0..200 {
            update_player(&grid, &mut agent);
            assert!(!grid.collides_with_wall(agent.x, agent.y, agent.radius));
            if agent.path.is_none() {
                break;
            }
        }

        assert!(agent.path.is_none());
        assert_eq!(agent.cell(&grid), goal);
        assert_eq!((agent.x, agent.y), grid.cell_center(goal));
        assert_eq!(agent.direction, Direction::None);
    }

    #[test]
    fn test_follow_path_recovers_off_center_start() {
        let grid = Grid::parse(LAYOUT, 20.0).unwrap();
        let mut agent = player(&grid, CellCoord::new(3, 1));
        // Right of centre: the straight move down would clip the wall
        agent.x += 3.0;
        agent.path = find_path(&grid, agent.cell(&grid), CellCoord::new(3, 3));

        for _ in 0..200 {
            update_player(&grid, &mut agent);
            assert!(!grid.collides_with_wall(agent.x, agent.y, agent.radius));
            if agent.path.is_none() {
                break;
            }
        }
        assert_eq!(agent.cell(&grid), CellCoord::new(3, 3));
    }

    #[test]
    fn test_empty_path_is_dropped() {
        let grid = Grid::parse(LAYOUT, 20.0).unwrap();
        let mut agent = player(&grid, CellCoord::new(2, 1));
        agent.path = find_path(&grid, CellCoord::new(2, 1), CellCoord::new(2, 1));
        assert!(agent.path.is_some());

        update_player(&grid, &mut agent);
        assert!(agent.path.is_none());
        assert_eq!((agent.x, agent.y), (50.0, 30.0));
    }
}
