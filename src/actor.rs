use crate::direction::Direction;
use crate::grid::{CellCoord, Grid};
use crate::pathfinding::Path;
use serde::{Deserialize, Serialize};

/// Ghost movement policy, fixed for the ghost's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    /// Heads straight for the player
    Chaser,
    /// Aims a few cells ahead of the player
    Ambusher,
    Random,
    /// Cycles through the maze corners
    Patroller,
}

impl Behavior {
    /// Assignment order by spawn index
    pub const SPAWN_ORDER: [Behavior; 4] = [
        Behavior::Chaser,
        Behavior::Ambusher,
        Behavior::Random,
        Behavior::Patroller,
    ];
}

/// Decision state private to one ghost
#[derive(Clone, Debug)]
pub struct GhostMind {
    behavior: Behavior,
    /// Simulation time (seconds) of the last decision; `None` until the first
    pub last_decision_at: Option<f64>,
    /// Seconds between throttled decisions
    pub decision_interval: f64,
    /// Index into the patrol waypoints, `None` before the first patrol decision
    pub patrol_target: Option<usize>,
}

impl GhostMind {
    pub fn new(behavior: Behavior, decision_interval: f64) -> Self {
        GhostMind {
            behavior,
            last_decision_at: None,
            decision_interval,
            patrol_target: None,
        }
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }
}

#[derive(Clone, Debug)]
pub enum AgentKind {
    Player,
    Ghost(GhostMind),
}

/// A moving entity with a continuous world position
#[derive(Clone, Debug)]
pub struct Agent {
    pub kind: AgentKind,

    /// World position (centre of the agent's box)
    pub x: f32,
    pub y: f32,

    /// Half-extent of the collision box
    pub radius: f32,

    /// Distance moved per simulation tick
    pub speed: f32,

    pub direction: Direction,
    /// Requested turn, committed once the move is legal
    pub next_direction: Direction,

    pub path: Option<Path>,
}

impl Agent {
    pub fn new(kind: AgentKind, x: f32, y: f32, radius: f32, speed: f32) -> Self {
        Agent {
            kind,
            x,
            y,
            radius,
            speed,
            direction: Direction::None,
            next_direction: Direction::None,
            path: None,
        }
    }

    /// Player centred on a cell
    pub fn player_at(grid: &Grid, cell: CellCoord, radius: f32, speed: f32) -> Self {
        let (x, y) = grid.cell_center(cell);
        Agent::new(AgentKind::Player, x, y, radius, speed)
    }

    /// Ghost centred on a cell
    pub fn ghost_at(
        grid: &Grid,
        cell: CellCoord,
        mind: GhostMind,
        radius: f32,
        speed: f32,
        direction: Direction,
    ) -> Self {
        let (x, y) = grid.cell_center(cell);
        let mut ghost = Agent::new(AgentKind::Ghost(mind), x, y, radius, speed);
        ghost.direction = direction;
        ghost
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, AgentKind::Player)
    }

    pub fn behavior(&self) -> Option<Behavior> {
        match &self.kind {
            AgentKind::Ghost(mind) => Some(mind.behavior()),
            AgentKind::Player => None,
        }
    }

    pub fn mind(&self) -> Option<&GhostMind> {
        match &self.kind {
            AgentKind::Ghost(mind) => Some(mind),
            AgentKind::Player => None,
        }
    }

    pub fn mind_mut(&mut self) -> Option<&mut GhostMind> {
        match &mut self.kind {
            AgentKind::Ghost(mind) => Some(mind),
            AgentKind::Player => None,
        }
    }

    /// Cell containing the agent's centre
    pub fn cell(&self, grid: &Grid) -> CellCoord {
        grid.world_to_cell(self.x, self.y)
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Move the agent onto a cell centre and forget any intent
    pub fn place_at(&mut self, grid: &Grid, cell: CellCoord) {
        let (x, y) = grid.cell_center(cell);
        self.x = x;
        self.y = y;
        self.direction = Direction::None;
        self.next_direction = Direction::None;
        self.path = None;
    }

    /// Get the corners of the agent's box
    pub fn get_bounds(&self) -> (f32, f32, f32, f32) {
        (
            self.x - self.radius,
            self.y - self.radius,
            self.x + self.radius,
            self.y + self.radius,
        )
    }
}
