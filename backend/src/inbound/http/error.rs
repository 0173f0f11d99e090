//! HTTP mapping for domain errors.
//!
//! Failures render in the RealWorld envelope `{"errors":{"body":[message]}}`,
//! extended with the machine-readable code, the trace identifier, and any
//! structured details. Internal errors are redacted before leaving the
//! service.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub(crate) const INTERNAL_MESSAGE: &str = "Internal server error";
pub(crate) const INVALID_FORMAT_MESSAGE: &str = "Invalid request format";

/// Messages of one failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorMessages {
    pub body: Vec<String>,
}

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub errors: ErrorMessages,
    /// Stable machine-readable code, e.g. `not_found`.
    #[schema(example = "unauthorized")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Offending `field` and `code` for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn code_name(code: ErrorCode) -> String {
    serde_json::to_value(code)
        .ok()
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_else(|| "internal_error".to_owned())
}

impl From<&Error> for ErrorEnvelope {
    fn from(err: &Error) -> Self {
        let internal = matches!(err.code(), ErrorCode::InternalError);
        let message = if internal {
            INTERNAL_MESSAGE.to_owned()
        } else {
            err.message().to_owned()
        };
        Self {
            errors: ErrorMessages {
                body: vec![message],
            },
            code: code_name(err.code()),
            trace_id: err.trace_id().map(str::to_owned),
            details: if internal { None } else { err.details().cloned() },
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = self.message(), trace_id = ?self.trace_id(), "internal error");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(ErrorEnvelope::from(self))
    }
}

/// `JsonConfig` error handler turning undecodable bodies into 422s.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "request body rejected");
    Error::validation_failed(INVALID_FORMAT_MESSAGE).into()
}
