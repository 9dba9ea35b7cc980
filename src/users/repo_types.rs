use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,       // assigned by the store, never changes
    pub login: String, // unique across all users
    pub password: String, // stored as given, never put in a response
}
