use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Connectivity as reported by the network layer.
///
/// The transition timestamps survive reconnects so messages that arrived
/// in the last offline window can still be identified afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub is_offline: bool,
    #[serde(default)]
    pub last_offline_at: Option<Timestamp>,
    #[serde(default)]
    pub last_online_at: Option<Timestamp>,
}

impl NetworkStatus {
    pub fn online() -> Self {
        Self::default()
    }

    /// Whether `created_at` falls inside the last known offline window.
    pub fn was_offline_at(&self, created_at: Timestamp) -> bool {
        let (Some(offline_at), Some(online_at)) = (self.last_offline_at, self.last_online_at) else {
            return false;
        };

        if created_at <= offline_at {
            return false;
        }

        self.is_offline || created_at < online_at
    }
}
