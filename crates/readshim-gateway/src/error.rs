use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use readshim_core::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, AppError>;

/// A request failure, rendered as a plain-text body with the status carried
/// by the wrapped [`Error`].
#[derive(Debug)]
pub struct AppError(Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<Error> for AppError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self.0, "request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readshim_core::CacheError;

    #[test]
    fn classified_statuses() {
        let cases = [
            (Error::BadRequest("expected -1 to be positive".into()), 400),
            (Error::MissingIds, 400),
            (Error::NotFound("work:9".into()), 404),
            (Error::Internal("decode".into()), 500),
            (Error::Cache(CacheError::Unavailable("redis".into())), 500),
            (
                Error::Upstream {
                    status: 503,
                    message: "maintenance".into(),
                },
                503,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(AppError::from(error).status().as_u16(), expected);
        }
    }

    #[test]
    fn invalid_upstream_status_falls_back_to_500() {
        let error = AppError::from(Error::Upstream {
            status: 42,
            message: "weird".into(),
        });
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn body_is_the_plain_text_message() {
        let response = AppError::from(Error::MissingIds).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"missing ids");
    }
}
