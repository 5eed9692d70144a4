use crate::{
    auth::LoginOutcome,
    custodia::{handlers, Auth},
};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
pub struct LoginRequest {
    pw: Option<String>,
}

#[derive(ToSchema, Serialize)]
pub struct LoggedIn {
    status: String,
    #[serde(rename = "authToken")]
    auth_token: String,
}

#[utoipa::path(
    put,
    path= "/users/{id}/auth",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Login successful", body = LoggedIn, content_type = "application/json"),
        (status = 401, description = "Missing or mismatched password"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Server error"),
    ),
    tag= "login"
)]
#[instrument(skip_all, fields(user = %id))]
pub async fn login(
    auth: Extension<Auth>,
    Path(id): Path<String>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let pw = payload.and_then(|Json(request)| request.pw);

    let Some(pw) = pw.filter(|pw| !pw.trim().is_empty()) else {
        return unauthorized_response(&id);
    };

    match auth.login(&id, &pw).await {
        Ok(LoginOutcome::LoggedIn { auth_token }) => Json(LoggedIn {
            status: "OK".to_string(),
            auth_token,
        })
        .into_response(),
        Ok(LoginOutcome::NotFound) => handlers::not_found_response(&id),
        Ok(LoginOutcome::Unauthorized) => unauthorized_response(&id),
        Err(err) => {
            error!("Error logging in user: {err:#}");
            handlers::server_error()
        }
    }
}

fn unauthorized_response(id: &str) -> Response {
    handlers::status_response(
        StatusCode::UNAUTHORIZED,
        "ERROR_UNAUTHORIZED",
        format!("/users/{id}/auth requires a valid 'pw' password"),
    )
}
