//! Hunt-mode profiles.
//!
//! Which craft roles a hunter-killer considers, and how much a role shifts its
//! attraction score.

use geoscape_core::enums::{CraftRole, HuntMode};

/// Role bias for one hunt mode. `None` means the role is ignored.
pub struct HuntProfile {
    pub interceptor: Option<i32>,
    pub transport: Option<i32>,
}

impl HuntProfile {
    pub fn bias(&self, role: CraftRole) -> Option<i32> {
        match role {
            CraftRole::Interceptor => self.interceptor,
            CraftRole::Transport => self.transport,
        }
    }
}

pub fn get_profile(mode: HuntMode) -> HuntProfile {
    match mode {
        HuntMode::Interceptors => HuntProfile {
            interceptor: Some(0),
            transport: None,
        },
        HuntMode::Transports => HuntProfile {
            interceptor: None,
            transport: Some(0),
        },
        // Prefer armed craft, but take a transport when nothing else is near.
        HuntMode::Any => HuntProfile {
            interceptor: Some(0),
            transport: Some(50),
        },
    }
}
