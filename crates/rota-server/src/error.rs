use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rota_core::RotaError;

/// Private sentinel error type used to carry an explicit HTTP 400 through
/// the `anyhow::Error` chain without touching the `RotaError` enum.
#[derive(Debug)]
struct BadRequest(String);

impl std::fmt::Display for BadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequest {}

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequest(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequest>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<RotaError>() {
            match e {
                RotaError::TeamNotFound(_)
                | RotaError::UserNotFound(_)
                | RotaError::PullRequestNotFound(_) => StatusCode::NOT_FOUND,
                RotaError::TeamExists(_) | RotaError::PullRequestExists(_) => StatusCode::CONFLICT,
                RotaError::AlreadyMerged(_)
                | RotaError::ReviewerNotAssigned { .. }
                | RotaError::NoCandidate { .. } => StatusCode::CONFLICT,
                RotaError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_not_found_maps_to_404() {
        let err = AppError(RotaError::TeamNotFound("core".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn user_not_found_maps_to_404() {
        let err = AppError(RotaError::UserNotFound("u1".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn pull_request_not_found_maps_to_404() {
        let err = AppError(RotaError::PullRequestNotFound("pr-1".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn team_exists_maps_to_409() {
        let err = AppError(RotaError::TeamExists("core".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn pull_request_exists_maps_to_409() {
        let err = AppError(RotaError::PullRequestExists("pr-1".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn already_merged_maps_to_409() {
        let err = AppError(RotaError::AlreadyMerged("pr-1".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn reviewer_not_assigned_maps_to_409() {
        let err = AppError(
            RotaError::ReviewerNotAssigned {
                pr: "pr-1".into(),
                user: "u1".into(),
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn no_candidate_maps_to_409() {
        let err = AppError(
            RotaError::NoCandidate {
                pr: "pr-1".into(),
                user: "u1".into(),
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_error_maps_to_500() {
        let err = AppError(RotaError::Store("connection refused".into()).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        let err = AppError::bad_request("no members provided");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn non_rota_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_body_is_json_with_error_field() {
        let err = AppError(RotaError::TeamNotFound("core".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
