use crate::{
    auth::RegisterOutcome,
    custodia::{handlers, Auth},
};
use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(IntoParams, Deserialize, Default)]
#[into_params(parameter_in = Query)]
pub struct RegisterParams {
    /// Plaintext password for the new user.
    pw: Option<String>,
}

#[derive(ToSchema, Serialize)]
pub struct Registered {
    status: String,
    #[serde(rename = "authToken")]
    auth_token: String,
}

#[utoipa::path(
    put,
    path= "/users/{id}",
    params(RegisterParams),
    responses (
        (status = 201, description = "Registration successful", body = Registered, content_type = "application/json"),
        (status = 303, description = "User with the specified id already exists"),
        (status = 400, description = "Missing profile body or password"),
        (status = 500, description = "Server error"),
    ),
    tag= "register"
)]
#[instrument(skip_all, fields(user = %id))]
pub async fn register(
    auth: Extension<Auth>,
    Path(id): Path<String>,
    query: Result<Query<RegisterParams>, QueryRejection>,
    payload: Option<Json<serde_json::Value>>,
) -> Response {
    let Some(Json(profile)) = payload else {
        error!("Missing profile body");
        return handlers::status_response(
            StatusCode::BAD_REQUEST,
            "missing-body",
            "register request must have a body".to_string(),
        );
    };

    let params = query.map(|Query(params)| params).unwrap_or_default();

    let Some(pw) = params.pw.filter(|pw| !pw.trim().is_empty()) else {
        error!("Missing password");
        return handlers::status_response(
            StatusCode::BAD_REQUEST,
            "missing-password",
            "register request must have a pw query parameter".to_string(),
        );
    };

    match auth.register(&id, &pw, profile).await {
        Ok(RegisterOutcome::Created { auth_token }) => (
            StatusCode::CREATED,
            [(LOCATION, format!("/users/{id}"))],
            Json(Registered {
                status: "CREATED".to_string(),
                auth_token,
            }),
        )
            .into_response(),
        Ok(RegisterOutcome::Exists) => {
            error!("User already exists");
            (
                StatusCode::SEE_OTHER,
                [(LOCATION, format!("/users/{id}"))],
                Json(json!({
                    "status": "EXISTS",
                    "info": format!("user {id} already exists"),
                })),
            )
                .into_response()
        }
        Err(err) => {
            error!("Error registering user: {err:#}");
            handlers::server_error()
        }
    }
}
