use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered author, as kept in the session and shown in templates. The
/// password hash never leaves the users service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}
