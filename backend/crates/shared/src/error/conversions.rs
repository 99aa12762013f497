//! Error conversions
//!
//! HTTP rendering of [`AppError`](super::app_error::AppError) when the
//! `axum` feature is on.

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for super::app_error::AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details for HTTP APIs
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::error::app_error::AppError;

    #[tokio::test]
    async fn test_problem_details_body() {
        let res = AppError::unauthorized("Session not found or expired")
            .with_action("Please sign in again")
            .into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 401);
        assert_eq!(body["detail"], "Session not found or expired");
        assert_eq!(body["action"], "Please sign in again");
    }
}
