use crate::{
    auth::InfoOutcome,
    custodia::{handlers, Auth},
};
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::{error, instrument};

#[utoipa::path(
    get,
    path= "/users/{id}",
    responses (
        (status = 200, description = "Profile submitted at registration"),
        (status = 401, description = "Missing, expired, or mismatched bearer token"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Server error"),
    ),
    tag= "info"
)]
#[instrument(skip_all, fields(user = %id))]
pub async fn info(auth: Extension<Auth>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    let token = handlers::bearer_token(&headers);

    match auth.get_info(&id, token.as_deref()).await {
        Ok(InfoOutcome::Profile(profile)) => Json(profile).into_response(),
        Ok(InfoOutcome::NotFound) => handlers::not_found_response(&id),
        Ok(InfoOutcome::Unauthorized) => handlers::status_response(
            StatusCode::UNAUTHORIZED,
            "ERROR_UNAUTHORIZED",
            format!("/users/{id} requires a bearer authorization header"),
        ),
        Err(err) => {
            error!("Error reading user info: {err:#}");
            handlers::server_error()
        }
    }
}
