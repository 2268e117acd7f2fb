//! Resolved caller identity handed to every core operation.

use serde::{Deserialize, Serialize};

use crate::domain::types::UserId;

/// Privilege level of a caller.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// An already-authenticated caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub role: Role,
    pub active: bool,
}

impl Caller {
    pub fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            active: true,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
