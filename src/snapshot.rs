use crate::actor::{Agent, Behavior};
use crate::direction::Direction;
use crate::error::SnapshotError;
use crate::grid::CellCoord;
use crate::session::{Collectible, SessionState, SessionStatus};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Point-in-time dump of a running session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub clock: f64,
    pub time_left: f64,
    pub score: u32,
    pub status: SessionStatus,
    pub teleporting: bool,
    /// Level in the text layout format
    pub layout: String,
    pub player: AgentSnapshot,
    pub ghosts: Vec<AgentSnapshot>,
    pub collectibles: Vec<Collectible>,
    /// Cells still ahead on the player's path
    pub path: Vec<CellCoord>,
}

/// Minimal agent data for dumping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub speed: f32,
    pub direction: Direction,
    pub behavior: Option<Behavior>,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        AgentSnapshot {
            x: agent.x,
            y: agent.y,
            radius: agent.radius,
            speed: agent.speed,
            direction: agent.direction,
            behavior: agent.behavior(),
        }
    }
}

impl SessionSnapshot {
    pub fn capture(session: &SessionState) -> Self {
        SessionSnapshot {
            clock: session.clock,
            time_left: session.time_left,
            score: session.score,
            status: session.status,
            teleporting: session.is_teleporting(),
            layout: session.grid.to_layout_string(),
            player: AgentSnapshot::from(&session.player),
            ghosts: session.ghosts.iter().map(AgentSnapshot::from).collect(),
            collectibles: session.collectibles.clone(),
            path: session
                .player
                .path
                .as_ref()
                .map(|p| p.remaining().to_vec())
                .unwrap_or_default(),
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
