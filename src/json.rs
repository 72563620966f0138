//! JSON body extractor whose rejections use the application's error shapes.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, FieldErrors};

pub(crate) const NOT_A_STRING: &str = "Not a valid string.";

/// Like [`axum::Json`], but for request bodies made of optional text fields.
///
/// Numbers are accepted for text fields and turned into their string form.
/// Booleans, arrays and objects are reported per field as a validation
/// error, and a body that is not a JSON object becomes a `non_field_errors`
/// entry. Unparseable JSON or a missing content type is a 400 with a
/// `detail` message.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;
        let body = coerce_text_fields(body)?;
        serde_json::from_value(body)
            .map(AppJson)
            .map_err(|e| AppError::MalformedBody(e.to_string()))
    }
}

fn coerce_text_fields(body: Value) -> Result<Value, FieldErrors> {
    let mut fields = match body {
        Value::Object(fields) => fields,
        other => {
            return Err(FieldErrors::single(
                "non_field_errors",
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_kind(&other)
                ),
            ))
        }
    };

    let mut errors = FieldErrors::new();
    for (name, value) in fields.iter_mut() {
        match value {
            Value::Null | Value::String(_) => {}
            Value::Number(n) => {
                let text = n.to_string();
                *value = Value::String(text);
            }
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => errors.add(name, NOT_A_STRING),
        }
    }

    if errors.is_empty() {
        Ok(Value::Object(fields))
    } else {
        Err(errors)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
