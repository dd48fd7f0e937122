pub mod actor;
pub mod config;
pub mod direction;
pub mod error;
pub mod ghost;
pub mod grid;
pub mod motion;
pub mod pathfinding;
pub mod session;
pub mod snapshot;

pub use actor::{Agent, AgentKind, Behavior, GhostMind};
pub use config::Config;
pub use direction::{Direction, CARDINALS};
pub use error::{ConfigError, LevelError, SnapshotError};
pub use grid::{CellCoord, CellMarker, Grid};
pub use pathfinding::{find_path, Path};
pub use session::{SessionEvent, SessionState, SessionStatus};
pub use snapshot::SessionSnapshot;
