use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use serde_derive::Serialize;
use std::error::Error;
use std::fmt;

pub type HandlerResponse<T> = Result<T, CodeErrorResp>;

pub struct CodeError {
    pub success: bool,
    pub error_code: u16,
    pub http_status_code: StatusCode,
    pub message: &'static str,
}

impl CodeError {
    pub const STORE_ERROR: CodeError = CodeError {
        success: false,
        error_code: 0,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Signup store request failed!",
    };
    pub const TEMPLATE_RENDER_ERROR: CodeError = CodeError {
        success: false,
        error_code: 1,
        http_status_code: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Could not render page template!",
    };
}

pub fn code_err(cerr: CodeError, e: impl fmt::Display) -> CodeErrorResp {
    CodeErrorResp {
        success: cerr.success,
        error_code: cerr.error_code,
        http_status_code: cerr.http_status_code,
        message: cerr.message.to_string(),
        error_message: e.to_string(),
    }
}

#[derive(Serialize, Debug)]
pub struct CodeErrorResp {
    pub success: bool,
    pub error_code: u16,
    #[serde(serialize_with = "serialize_status_code")]
    pub http_status_code: StatusCode,
    pub message: String,
    pub error_message: String,
}

fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

impl fmt::Display for CodeErrorResp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.error_message)
    }
}

impl Error for CodeErrorResp {}

// The logging middleware reads and strips the x-error-* headers.
impl IntoResponse for CodeErrorResp {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string());
        let mut response = (
            self.http_status_code,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response();

        let headers = response.headers_mut();
        headers.insert("x-error-log-level", HeaderValue::from_static("ERROR"));
        if let Ok(v) = HeaderValue::from_str(self.http_status_code.as_str()) {
            headers.insert("x-error-status-code", v);
        }
        if let Ok(v) = HeaderValue::from_str(&self.error_code.to_string()) {
            headers.insert("x-error-code", v);
        }
        if let Ok(v) = HeaderValue::from_str(&self.message) {
            headers.insert("x-error-message", v);
        }
        if let Ok(v) = HeaderValue::from_str(&self.error_message) {
            headers.insert("x-error-detail", v);
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_maps_to_500_with_json_body() {
        let resp = code_err(CodeError::STORE_ERROR, "throttled");
        assert_eq!(resp.to_string(), "Signup store request failed!: throttled");

        let response = resp.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(response.headers().get("x-error-detail").unwrap(), "throttled");
    }
}
