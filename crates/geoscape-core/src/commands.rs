//! Player commands sent from the screen layer to the simulation.
//!
//! Commands are queued and applied at the next `advance` boundary.

use serde::{Deserialize, Serialize};

use crate::target::Target;
use crate::types::CraftId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Craft orders ---
    /// Send a ready craft out toward a target.
    LaunchCraft { craft: CraftId, target: Target },
    /// Change the destination of a craft already out.
    RedirectCraft { craft: CraftId, target: Target },
    ReturnToBase { craft: CraftId },

    // --- Interception window control ---
    MinimizeDogfight { craft: CraftId },
    RestoreDogfight { craft: CraftId },
    /// Break off and send the craft home.
    DisengageDogfight { craft: CraftId },
}
