//! One level's worth of game state, advanced a fixed tick at a time.
//!
//! Timed sequences (the teleport after a pickup, the session countdown) are
//! stored as start times and durations and evaluated against the simulation
//! clock on every tick.

use crate::actor::{Agent, Behavior};
use crate::config::Config;
use crate::direction::Direction;
use crate::error::LevelError;
use crate::ghost;
use crate::grid::{CellCoord, Grid};
use crate::motion;
use crate::pathfinding::{find_path, format_path};
use crate::snapshot::SessionSnapshot;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A pickup sitting on a spawn cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub cell: CellCoord,
    /// The round's single correct pickup; everything else is a decoy
    pub is_target: bool,
    pub collected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    Caught,
    WrongPick,
    TimeUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Running,
    Over(GameOverReason),
}

/// Things that happened during a tick, for the caller to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TargetCollected { cell: CellCoord, score: u32 },
    DecoyCollected { cell: CellCoord },
    CaughtByGhost { behavior: Behavior },
    /// Ghosts now on the board; spawn cells and behaviors cap this below
    /// the requested count
    GhostsIncreased { count: usize },
    /// Player returned to the start cell halfway through the teleport
    Teleported,
    /// Fresh collectibles placed after the target was taken
    RoundStarted,
    TimeUp,
}

/// Teleport sequence started by a target pickup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Teleport {
    pub started_at: f64,
    pub duration: f64,
    /// Player already moved back to the start
    pub relocated: bool,
    /// Place a new round of collectibles when the sequence ends
    pub round_cleared: bool,
}

impl Teleport {
    /// Fraction of the sequence elapsed, 0.0 to 1.0
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
    }
}

/// Place the target and then the decoys on spawn cells, keeping every pair at
/// least `min_spacing` cells apart on some axis. Decoys that do not fit are
/// skipped.
pub fn place_collectibles(
    grid: &Grid,
    decoys: usize,
    min_spacing: i32,
    rng: &mut StdRng,
) -> Vec<Collectible> {
    let spawns = grid.spawn_cells();
    let mut placed: Vec<Collectible> = Vec::new();

    let Some(&target) = spawns.choose(rng) else {
        warn!("level has no spawn cells, no collectibles placed");
        return placed;
    };
    placed.push(Collectible {
        cell: target,
        is_target: true,
        collected: false,
    });

    for _ in 0..decoys {
        let valid: Vec<CellCoord> = spawns
            .iter()
            .copied()
            .filter(|pos| {
                !placed.iter().any(|other| {
                    (pos.x - other.cell.x).abs() < min_spacing
                        && (pos.y - other.cell.y).abs() < min_spacing
                })
            })
            .collect();

        match valid.choose(rng) {
            Some(&cell) => placed.push(Collectible {
                cell,
                is_target: false,
                collected: false,
            }),
            None => {
                warn!(placed = placed.len(), "no room for another decoy, skipping");
            }
        }
    }

    placed
}

pub struct SessionState {
    config: Config,
    pub grid: Grid,
    pub player: Agent,
    pub ghosts: Vec<Agent>,
    pub collectibles: Vec<Collectible>,
    /// Simulation clock in seconds
    pub clock: f64,
    pub time_left: f64,
    pub score: u32,
    pub ghost_count: usize,
    pub teleport: Option<Teleport>,
    pub status: SessionStatus,
    start_cell: CellCoord,
    rng: StdRng,
}

impl SessionState {
    /// Start a session on `grid`. The player starts on the first open cell.
    pub fn new(grid: Grid, config: &Config, mut rng: StdRng) -> Result<Self, LevelError> {
        let start_cell = grid.first_open_cell().ok_or(LevelError::NoPlayerStart)?;
        let player = Agent::player_at(&grid, start_cell, config.player.radius, config.player.speed);
        let ghost_count = config.ghosts.initial_count;
        let ghosts = ghost::spawn_ghosts(&grid, ghost_count, &config.ghosts, &mut rng);
        let collectibles = place_collectibles(
            &grid,
            config.session.decoys,
            config.session.min_spacing,
            &mut rng,
        );

        info!(
            rows = grid.rows,
            cols = grid.cols,
            ghosts = ghosts.len(),
            collectibles = collectibles.len(),
            "session started"
        );

        Ok(SessionState {
            config: config.clone(),
            grid,
            player,
            ghosts,
            collectibles,
            clock: 0.0,
            time_left: config.session.duration_secs,
            score: 0,
            ghost_count,
            teleport: None,
            status: SessionStatus::Running,
            start_cell,
            rng,
        })
    }

    /// Reset everything except the grid
    pub fn restart(&mut self) {
        self.player.place_at(&self.grid, self.start_cell);
        self.ghost_count = self.config.ghosts.initial_count;
        self.respawn_ghosts();
        self.collectibles = place_collectibles(
            &self.grid,
            self.config.session.decoys,
            self.config.session.min_spacing,
            &mut self.rng,
        );
        self.clock = 0.0;
        self.time_left = self.config.session.duration_secs;
        self.score = 0;
        self.teleport = None;
        self.status = SessionStatus::Running;
        info!("session restarted");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn start_cell(&self) -> CellCoord {
        self.start_cell
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn is_teleporting(&self) -> bool {
        self.teleport.is_some()
    }

    /// Steer the player. Cancels any active path.
    pub fn request_direction(&mut self, dir: Direction) {
        if !self.is_running() || self.is_teleporting() {
            return;
        }
        if self.player.path.take().is_some() {
            debug!("path cancelled by direction input");
        }
        self.player.next_direction = dir;
    }

    /// Plan a path from the player's cell to `goal`. Returns false when no
    /// route exists; the player is left idle in that case.
    pub fn request_target(&mut self, goal: CellCoord) -> bool {
        if !self.is_running() || self.is_teleporting() {
            return false;
        }

        let start = self.player.cell(&self.grid);
        self.player.path = None;
        self.player.next_direction = Direction::None;

        match find_path(&self.grid, start, goal) {
            Some(path) => {
                debug!(?start, ?goal, path = %format_path(path.cells()), "following path");
                self.player.path = Some(path);
                true
            }
            None => {
                debug!(?start, ?goal, "no route to target");
                self.player.direction = Direction::None;
                false
            }
        }
    }

    /// Cell of the first uncollected collectible within the click radius of
    /// the world point (x, y)
    pub fn collectible_at(&self, x: f32, y: f32) -> Option<CellCoord> {
        let radius = self.config.session.click_radius;
        self.collectibles
            .iter()
            .filter(|c| !c.collected)
            .map(|c| c.cell)
            .find(|&cell| {
                let (cx, cy) = self.grid.cell_center(cell);
                ((x - cx).powi(2) + (y - cy).powi(2)).sqrt() < radius
            })
    }

    /// Path to the collectible under the world point (x, y). False when
    /// nothing was hit or there is no route to it.
    pub fn click_at(&mut self, x: f32, y: f32) -> bool {
        match self.collectible_at(x, y) {
            Some(cell) => self.request_target(cell),
            None => false,
        }
    }

    /// Advance the simulation by one tick of `dt` seconds
    pub fn tick(&mut self, dt: f64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.is_running() {
            return events;
        }

        self.clock += dt;
        self.time_left -= dt;
        if self.time_left <= 0.0 {
            self.time_left = 0.0;
            self.finish(GameOverReason::TimeUp);
            events.push(SessionEvent::TimeUp);
            return events;
        }

        self.update_teleport(&mut events);

        if !self.is_teleporting() {
            motion::update_player(&self.grid, &mut self.player);
        }

        for g in self.ghosts.iter_mut() {
            ghost::decide(&self.grid, g, &self.player, self.clock, &mut self.rng);
            motion::step(&self.grid, g);
        }

        if !self.is_teleporting() {
            self.check_collectibles(&mut events);
        }
        if self.is_running() && !self.is_teleporting() {
            self.check_ghosts(&mut events);
        }

        events
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    fn finish(&mut self, reason: GameOverReason) {
        info!(?reason, score = self.score, "game over");
        self.status = SessionStatus::Over(reason);
        self.player.path = None;
    }

    fn respawn_ghosts(&mut self) {
        self.ghosts =
            ghost::spawn_ghosts(&self.grid, self.ghost_count, &self.config.ghosts, &mut self.rng);
    }

    fn update_teleport(&mut self, events: &mut Vec<SessionEvent>) {
        let Some(mut teleport) = self.teleport else {
            return;
        };
        let elapsed = self.clock - teleport.started_at;

        if !teleport.relocated && elapsed >= teleport.duration / 2.0 {
            self.player.place_at(&self.grid, self.start_cell);
            self.respawn_ghosts();
            teleport.relocated = true;
            events.push(SessionEvent::Teleported);
            debug!("player teleported to start");
        }

        if elapsed >= teleport.duration {
            self.teleport = None;
            if teleport.round_cleared {
                self.collectibles = place_collectibles(
                    &self.grid,
                    self.config.session.decoys,
                    self.config.session.min_spacing,
                    &mut self.rng,
                );
                events.push(SessionEvent::RoundStarted);
                info!(score = self.score, "new round");
            }
        } else {
            self.teleport = Some(teleport);
        }
    }

    fn check_collectibles(&mut self, events: &mut Vec<SessionEvent>) {
        let (left, top, right, bottom) = self.player.get_bounds();
        let size = self.grid.cell_size;

        let touched = self.collectibles.iter().position(|c| {
            if c.collected {
                return false;
            }
            let cell_left = c.cell.x as f32 * size;
            let cell_top = c.cell.y as f32 * size;
            right > cell_left && left < cell_left + size && bottom > cell_top && top < cell_top + size
        });
        let Some(index) = touched else {
            return;
        };

        self.collectibles[index].collected = true;
        let cell = self.collectibles[index].cell;

        // A consumed destination ends the path
        if self.player.path.as_ref().and_then(|p| p.goal()) == Some(cell) {
            self.player.path = None;
        }

        if !self.collectibles[index].is_target {
            events.push(SessionEvent::DecoyCollected { cell });
            self.finish(GameOverReason::WrongPick);
            return;
        }

        self.score += self.config.session.target_score;
        events.push(SessionEvent::TargetCollected {
            cell,
            score: self.score,
        });
        info!(?cell, score = self.score, "target collected");

        let round_cleared = self
            .collectibles
            .iter()
            .all(|c| !c.is_target || c.collected);
        self.player.path = None;
        self.player.direction = Direction::None;
        self.player.next_direction = Direction::None;
        self.teleport = Some(Teleport {
            started_at: self.clock,
            duration: self.config.session.teleport_secs,
            relocated: false,
            round_cleared,
        });

        let step = self.config.ghosts.escalation_score;
        if step > 0 && self.score > 0 && self.score % step == 0 && self.ghost_count < self.config.ghosts.max_count {
            self.ghost_count += 1;
            self.respawn_ghosts();
            events.push(SessionEvent::GhostsIncreased {
                count: self.ghosts.len(),
            });
            info!(
                requested = self.ghost_count,
                spawned = self.ghosts.len(),
                "ghost count increased"
            );
        }
    }

    fn check_ghosts(&mut self, events: &mut Vec<SessionEvent>) {
        let caught = self.ghosts.iter().find(|g| {
            g.distance_to(self.player.x, self.player.y) < self.player.radius + g.radius
        });
        if let Some(behavior) = caught.and_then(Agent::behavior) {
            events.push(SessionEvent::CaughtByGhost { behavior });
            self.finish(GameOverReason::Caught);
        }
    }
}
