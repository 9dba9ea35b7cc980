use utoipa::OpenApi;

use crate::users::{dto, handlers};

pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "userdesk",
        description = "User accounts: create, list, fetch, update and delete.",
        version = "1.0.0"
    ),
    paths(
        handlers::create_user,
        handlers::list_users,
        handlers::get_user,
        handlers::update_user,
        handlers::delete_user,
    ),
    components(schemas(
        dto::UserPayload,
        dto::UserResponse,
        dto::DeletedResponse,
        dto::ErrorBody,
    )),
    tags((name = "users", description = "User CRUD"))
)]
pub struct ApiDoc;
