use serde::{Deserialize, Serialize};

/// Id of the authenticated caller.
///
/// Every accessor that reads or writes per-user rows takes an `OwnerId`, and
/// the only way to obtain one outside this crate is a verified bearer token,
/// so a query cannot forget to scope itself to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(i64);

impl OwnerId {
    pub(crate) fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// Public user record. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    pub created_at: String,
}

/// Row needed to check a login attempt.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

impl UserCredentials {
    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.user.id)
    }
}
