//! Shared port data types.

use serde::{Deserialize, Serialize};

use itemflow_domain::UserId;

/// A user connected to (or known by) the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub is_gm: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl SessionUser {
    pub fn player(name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            is_gm: false,
            active: true,
        }
    }

    pub fn gm(name: impl Into<String>) -> Self {
        Self {
            is_gm: true,
            ..Self::player(name)
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
