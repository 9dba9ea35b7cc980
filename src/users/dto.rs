use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::users::repo_types::User;

/// Request body for create and update.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserPayload {
    #[schema(example = "alice")]
    pub login: String,
    #[schema(example = "p1")]
    pub password: String,
}

/// Public view of a user; the password never leaves the service.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "alice")]
    pub login: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            login: u.login,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    #[schema(example = "User deleted successfully")]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "User 1 not found")]
    pub detail: String,
}
