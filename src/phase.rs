//! Game loop phases that systems bind to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Named stage of the per-frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameLoopType {
    /// Simulation and gameplay logic
    Update,
    /// Draw submission
    Render,
}

impl GameLoopType {
    /// Every phase, in the default frame order
    pub const ALL: [GameLoopType; 2] = [GameLoopType::Update, GameLoopType::Render];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameLoopType::Update => "Update",
            GameLoopType::Render => "Render",
        }
    }
}

impl fmt::Display for GameLoopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_updates_before_render() {
        assert_eq!(GameLoopType::ALL[0], GameLoopType::Update);
        assert_eq!(GameLoopType::ALL[1], GameLoopType::Render);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&GameLoopType::Render).unwrap();
        assert_eq!(json, "\"Render\"");
        let phase: GameLoopType = serde_json::from_str("\"Update\"").unwrap();
        assert_eq!(phase, GameLoopType::Update);
    }
}
