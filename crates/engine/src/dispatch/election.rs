//! Execution host election.
//!
//! Every connected client receives every hook, so exactly one of them must
//! run an event's rules. Each client evaluates the same deterministic policy
//! against its own view of the session; the result is advisory and can
//! disagree between clients whose views differ (e.g. a user disconnecting
//! mid-operation).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use itemflow_domain::{OwnershipLevel, UserId};

use crate::infrastructure::ports::SessionUser;

/// Which client runs an event's rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionHost {
    /// An active player owning the document, else the first active GM
    #[default]
    Owner,
    /// The first active GM
    Gm,
    /// The client whose action triggered the operation
    Source,
}

/// One client's view of the session for a single election.
#[derive(Debug, Clone, Copy)]
pub struct ElectionContext<'a> {
    pub local: &'a SessionUser,
    /// All users, in session order
    pub users: &'a [SessionUser],
    /// Effective ownership of the event's document
    pub owners: &'a BTreeMap<UserId, OwnershipLevel>,
    pub source_user: UserId,
}

impl ExecutionHost {
    /// The user who should run the rules, if anyone qualifies.
    pub fn designated(&self, ctx: &ElectionContext<'_>) -> Option<UserId> {
        match self {
            Self::Owner => first_active_owner(ctx).or_else(|| first_active_gm(ctx)),
            Self::Gm => first_active_gm(ctx),
            Self::Source => Some(ctx.source_user),
        }
    }

    pub fn should_execute(&self, ctx: &ElectionContext<'_>) -> bool {
        self.designated(ctx) == Some(ctx.local.id)
    }
}

fn first_active_owner(ctx: &ElectionContext<'_>) -> Option<UserId> {
    ctx.users
        .iter()
        .find(|user| {
            user.active
                && !user.is_gm
                && ctx.owners.get(&user.id) == Some(&OwnershipLevel::Owner)
        })
        .map(|user| user.id)
}

fn first_active_gm(ctx: &ElectionContext<'_>) -> Option<UserId> {
    ctx.users
        .iter()
        .find(|user| user.active && user.is_gm)
        .map(|user| user.id)
}
