use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    response::{IntoResponse, Response},
};

use crate::errors::{Error, FieldErrors};

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// `axum::Json` whose rejections use the API error shape.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        let (field, message) = match &rejection {
            JsonRejection::JsonDataError(e) => field_and_message(&e.body_text()),
            _ => ("non_field_errors".to_string(), rejection.body_text()),
        };
        Error::Validation(FieldErrors::single(field, message))
    }
}

// "tickets[0].row: invalid type: ..." -> ("tickets[0].row", "invalid type: ...")
fn field_and_message(body: &str) -> (String, String) {
    let detail = body.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(body);
    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            (path.to_string(), message.to_string())
        }
        _ => ("non_field_errors".to_string(), detail.to_string()),
    }
}
