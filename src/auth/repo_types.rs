use sqlx::FromRow;
use time::OffsetDateTime;

/// Credential row in `login`. Never serialized to clients.
#[derive(Debug, Clone, FromRow)]
pub struct LoginRecord {
    pub email: String,
    pub password_hash: String, // argon2 PHC string
}

/// Profile row in `users`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub entries: i64,
    pub joined: OffsetDateTime, // stored in UTC
}

/// Validated input for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub joined: OffsetDateTime,
}
