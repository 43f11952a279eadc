use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Serialize, Serializer};

/// Status code carried in the body of every health response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    Success = 0,
    NotReady = 1503,
}

impl Status {
    pub fn http_status(self) -> StatusCode {
        match self {
            Status::Success => StatusCode::OK,
            Status::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(*self as u16)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            message: String::new(),
            data,
        }
    }

    pub fn not_ready(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::NotReady,
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status.http_status(), Json(self)).into_response()
    }
}
