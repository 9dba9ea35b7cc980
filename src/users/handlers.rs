use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderName, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn, Span};

use crate::{
    state::AppState,
    users::{
        dto::{DeletedResponse, ErrorBody, UserPayload, UserResponse},
        error::UserError,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn invalid<R: std::fmt::Display>(rejection: R) -> UserError {
    warn!(error = %rejection, "rejected request");
    UserError::Validation(rejection.to_string())
}

fn user_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, UserError> {
    let Path(id) = id.map_err(invalid)?;
    Span::current().record("user_id", id);
    Ok(id)
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Malformed payload or login already taken", body = ErrorBody),
    )
)]
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<UserResponse>), UserError> {
    let Json(payload) = payload.map_err(invalid)?;

    let user = match state.users.create(&payload.login, &payload.password).await {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, login = %payload.login, "create user failed");
            return Err(e);
        }
    };

    info!(user_id = user.id, login = %user.login, "user created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{}", user.id))],
        Json(user.into()),
    ))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses((status = 200, description = "All users", body = [UserResponse]))
)]
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, UserError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "No user with this id", body = ErrorBody),
    )
)]
#[instrument(skip(state, id), fields(user_id))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserResponse>, UserError> {
    let id = user_id(id)?;
    let user = state.users.get(id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Malformed payload or login already taken", body = ErrorBody),
        (status = 404, description = "No user with this id", body = ErrorBody),
    )
)]
#[instrument(skip(state, id, payload), fields(user_id))]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<UserResponse>, UserError> {
    let id = user_id(id)?;
    let Json(payload) = payload.map_err(invalid)?;

    let user = match state.users.update(id, &payload.login, &payload.password).await {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "update user failed");
            return Err(e);
        }
    };

    info!(login = %user.login, "user updated");
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = DeletedResponse),
        (status = 404, description = "No user with this id", body = ErrorBody),
    )
)]
#[instrument(skip(state, id), fields(user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedResponse>, UserError> {
    let id = user_id(id)?;
    state.users.delete(id).await?;

    info!("user deleted");
    Ok(Json(DeletedResponse {
        message: "User deleted successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, Response},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::app::build_app;

    fn app() -> Router {
        build_app(AppState::in_memory())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(res: Response<Body>) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn payload(login: &str, password: &str) -> Option<Value> {
        Some(json!({"login": login, "password": password}))
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let app = app();

        let res = send(&app, "POST", "/users", payload("alice", "p1")).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()[header::LOCATION], "/users/1");
        assert_eq!(json_body(res).await, json!({"id": 1, "login": "alice"}));

        let res = send(&app, "GET", "/users/1", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({"id": 1, "login": "alice"}));

        let res = send(&app, "PUT", "/users/1", payload("alice2", "p2")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({"id": 1, "login": "alice2"}));

        let res = send(&app, "DELETE", "/users/1", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

        let res = send(&app, "GET", "/users/1", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(json_body(res).await["detail"].is_string());
    }

    #[tokio::test]
    async fn duplicate_login_is_bad_request() {
        let app = app();
        let first = send(&app, "POST", "/users", payload("alice", "p1")).await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = send(&app, "POST", "/users", payload("alice", "p1")).await;
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let body = json_body(second).await;
        assert!(body["detail"].as_str().unwrap().contains("alice"));
    }

    #[tokio::test]
    async fn list_returns_public_fields_only() {
        let app = app();
        send(&app, "POST", "/users", payload("a", "x")).await;
        send(&app, "POST", "/users", payload("b", "y")).await;

        let res = send(&app, "GET", "/users", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            json_body(res).await,
            json!([{"id": 1, "login": "a"}, {"id": 2, "login": "b"}])
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = app();
        let get = send(&app, "GET", "/users/42", None).await;
        assert_eq!(get.status(), StatusCode::NOT_FOUND);

        let put = send(&app, "PUT", "/users/42", payload("ghost", "p")).await;
        assert_eq!(put.status(), StatusCode::NOT_FOUND);

        let delete = send(&app, "DELETE", "/users/42", None).await;
        assert_eq!(delete.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_payloads_are_bad_request() {
        let app = app();
        let missing = send(&app, "POST", "/users", Some(json!({"login": "alice"}))).await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(missing).await["detail"].is_string());

        let wrong_type = json!({"login": 5, "password": "p"});
        let res = send(&app, "POST", "/users", Some(wrong_type)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let no_body = send(&app, "POST", "/users", None).await;
        assert_eq!(no_body.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nul_in_login_is_bad_request() {
        let app = app();
        let res = send(&app, "POST", "/users", payload("a\u{0}b", "p")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(res).await["detail"].is_string());

        send(&app, "POST", "/users", payload("alice", "p1")).await;
        let res = send(&app, "PUT", "/users/1", payload("alice", "p\u{0}")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let app = app();
        let res = send(&app, "GET", "/users/abc", None).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_onto_taken_login_is_bad_request() {
        let app = app();
        send(&app, "POST", "/users", payload("a", "x")).await;
        send(&app, "POST", "/users", payload("b", "y")).await;

        let res = send(&app, "PUT", "/users/2", payload("a", "z")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn handler_spans_carry_user_id() {
        use std::sync::{Arc, Mutex};

        let logs = Arc::new(Mutex::new(Vec::<u8>::new()));
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = app();
        send(&app, "POST", "/users", payload("alice", "p1")).await;
        send(&app, "DELETE", "/users/1", None).await;

        let out = String::from_utf8(logs.lock().unwrap().clone()).unwrap();
        assert!(out.contains("delete_user{user_id=1}"), "{out}");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let res = send(&app(), "GET", "/health", None).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn openapi_document_lists_user_routes() {
        let res = send(&app(), "GET", "/api-docs/openapi.json", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let doc = json_body(res).await;
        assert!(doc["paths"]["/users"]["post"].is_object());
        assert!(doc["paths"]["/users/{id}"]["get"].is_object());
        assert!(doc["paths"]["/users/{id}"]["put"].is_object());
        assert!(doc["paths"]["/users/{id}"]["delete"].is_object());
        assert!(doc["components"]["schemas"]["UserResponse"].is_object());
    }

    #[tokio::test]
    async fn interactive_docs_are_served() {
        let app = app();
        let swagger = send(&app, "GET", "/docs", None).await;
        let status = swagger.status();
        assert!(status.is_success() || status.is_redirection(), "got {status}");

        let redoc = send(&app, "GET", "/redoc", None).await;
        assert_eq!(redoc.status(), StatusCode::OK);
    }

    #[test]
    fn user_response_hides_password() {
        let response = UserResponse {
            id: 1,
            login: "alice".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("password"));
    }
}
