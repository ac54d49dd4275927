//! Fixed session view.

use itemflow_domain::UserId;

use crate::infrastructure::ports::{SessionPort, SessionUser};

/// A session whose membership does not change.
#[derive(Debug, Clone)]
pub struct StaticSession {
    local: SessionUser,
    users: Vec<SessionUser>,
}

impl StaticSession {
    /// Run as `local` among `users`. Returns `None` if `local` is not a member.
    pub fn new(users: Vec<SessionUser>, local: UserId) -> Option<Self> {
        let local = users.iter().find(|user| user.id == local)?.clone();
        Some(Self { local, users })
    }

    /// A one-user session with a GM.
    pub fn solo_gm(name: impl Into<String>) -> Self {
        let gm = SessionUser::gm(name);
        Self {
            local: gm.clone(),
            users: vec![gm],
        }
    }
}

impl SessionPort for StaticSession {
    fn local_user(&self) -> SessionUser {
        self.local.clone()
    }

    fn users(&self) -> Vec<SessionUser> {
        self.users.clone()
    }
}
