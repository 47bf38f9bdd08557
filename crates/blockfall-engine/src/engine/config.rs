use serde::{Deserialize, Serialize};

use crate::{Position, engine::PieceSeed};

/// Construction parameters of a [`GameEngine`](super::GameEngine).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use blockfall_engine::{EngineConfig, Position};
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "board_width": 10 }"#).unwrap();
/// assert_eq!(config.board_height, 24);
/// assert_eq!(config.spawn_point(), Position::new(2, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board_width: usize,
    pub board_height: usize,
    /// Spawn column; defaults to three cells left of the board center.
    pub spawn_x: Option<i32>,
    pub spawn_y: i32,
    /// Seed of the piece generator; a random one is drawn when unset.
    pub seed: Option<PieceSeed>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_width: Self::DEFAULT_WIDTH,
            board_height: Self::DEFAULT_HEIGHT,
            spawn_x: None,
            spawn_y: 0,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub const DEFAULT_WIDTH: usize = 20;
    pub const DEFAULT_HEIGHT: usize = 24;

    #[must_use]
    pub fn spawn_point(&self) -> Position {
        let x = self.spawn_x.unwrap_or_else(|| {
            i32::try_from((self.board_width / 2).saturating_sub(3)).unwrap_or(0)
        });
        Position::new(x, self.spawn_y)
    }
}
