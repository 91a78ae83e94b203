//! Identity of the signed-in user, as handed over by the host.

use serde::{Deserialize, Serialize};

/// The current user. The core only reads it to attribute comments; signing
/// in and authorizing board access happen elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}
