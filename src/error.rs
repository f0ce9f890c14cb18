use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::{net::AddrParseError, path::PathBuf};

pub type StudentsResult<T> = Result<T, StudentsError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StudentsError {
    #[snafu(display("Name and email are required"))]
    MissingField { field: &'static str },
    #[snafu(display("Field `{}` must be {}", field, expected))]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[snafu(display("Request body must be a JSON object"))]
    InvalidBody { source: JsonRejection },
    #[snafu(display("Student not found"))]
    MissingStudent { id: String },
    #[snafu(display("Route not found"))]
    RouteNotFound { requested_url: String },
    #[snafu(display("Unable to read datastore"))]
    ReadDatastore {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Unable to parse datastore"))]
    ParseDatastore {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[snafu(display("Error serialising datastore"))]
    SerialiseDatastore { source: serde_json::Error },
    #[snafu(display("Unable to write datastore"))]
    WriteDatastore {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse socket address {:?}", original))]
    ParseSocketAddr {
        source: AddrParseError,
        original: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    requested_url: Option<String>,
}

impl StudentsError {
    pub const fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::MissingField { .. } | Self::InvalidField { .. } | Self::InvalidBody { .. } => BI,
            Self::MissingStudent { .. } | Self::RouteNotFound { .. } => NF,
            Self::ReadDatastore { .. }
            | Self::ParseDatastore { .. }
            | Self::SerialiseDatastore { .. }
            | Self::WriteDatastore { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseSocketAddr { .. } => ISE,
        }
    }

    ///the underlying cause, surfaced to clients for diagnostics
    fn diagnostic(&self) -> Option<String> {
        match self {
            Self::InvalidBody { source } => Some(source.body_text()),
            Self::ReadDatastore { source, .. } | Self::WriteDatastore { source, .. } => {
                Some(source.to_string())
            }
            Self::ParseDatastore { source, .. } | Self::SerialiseDatastore { source } => {
                Some(source.to_string())
            }
            Self::BadEnvVar { source, .. } => Some(source.to_string()),
            Self::ParseSocketAddr { source, .. } => Some(source.to_string()),
            Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::MissingStudent { .. }
            | Self::RouteNotFound { .. } => None,
        }
    }
}

impl IntoResponse for StudentsError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(%self, ?status_code, "Rejected request");
        }

        let requested_url = match &self {
            Self::RouteNotFound { requested_url } => Some(requested_url.clone()),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            error: self.diagnostic(),
            requested_url,
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: StudentsError) -> (StatusCode, Value) {
        let rsp = err.into_response();
        let status = rsp.status();
        let bytes = to_bytes(rsp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            StudentsError::MissingField { field: "name" }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StudentsError::MissingStudent { id: "x".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StudentsError::WriteDatastore {
                source: std::io::Error::other("disk full"),
                path: "db.json".into(),
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn storage_errors_carry_the_underlying_message() {
        let (status, body) = body_of(StudentsError::ReadDatastore {
            source: std::io::Error::other("disk on fire"),
            path: "db.json".into(),
        })
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "disk on fire");
        assert_eq!(body["message"], "Unable to read datastore");
        assert!(!body.to_string().contains("db.json"));
    }

    #[tokio::test]
    async fn not_found_bodies_have_no_error_field() {
        let (status, body) = body_of(StudentsError::MissingStudent { id: "nope".into() }).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Student not found");
        assert!(body.get("error").is_none());
        assert!(body.get("requestedUrl").is_none());
    }

    #[tokio::test]
    async fn route_not_found_echoes_the_url() {
        let (status, body) = body_of(StudentsError::RouteNotFound {
            requested_url: "/api/courses?x=1".into(),
        })
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["requestedUrl"], "/api/courses?x=1");
    }
}
