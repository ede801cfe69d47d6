use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::auth::repo_types::UserRecord;

/// Request body for registration. Fields are optional so missing values
/// surface as validation errors rather than body rejections.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for sign-in.
#[derive(Debug, Default, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User as returned to the client.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub entries: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub joined: OffsetDateTime,
}

impl UserResponse {
    /// `joined` is converted to the display offset; the instant is unchanged.
    pub fn present(user: UserRecord, offset: UtcOffset) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            entries: user.entries,
            joined: user.joined.to_offset(offset),
        }
    }
}
