//! Request and response envelopes of the query protocol.

use animals_catalog_sdk::{CatalogError, RemoteErrorDetail};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Operation;

/// Longest body excerpt quoted in a transport error.
const BODY_PREVIEW_LEN: usize = 200;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest<'a> {
    pub operation_name: &'static str,
    pub query: &'static str,
    pub variables: &'a Value,
}

impl<'a> QueryRequest<'a> {
    pub(crate) fn new(operation: Operation, variables: &'a Value) -> Self {
        Self {
            operation_name: operation.name(),
            query: operation.document(),
            variables,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<ErrorEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEntry {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<Value>>,
}

impl From<ErrorEntry> for RemoteErrorDetail {
    fn from(entry: ErrorEntry) -> Self {
        let path = entry.path.filter(|p| !p.is_empty()).map(|segments| {
            segments
                .iter()
                .map(|segment| match segment {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        });
        Self {
            message: entry.message,
            path,
        }
    }
}

/// Turn a raw HTTP response into the `data` object of the envelope.
///
/// - any non-empty `errors` array wins, even next to partial data
/// - a non-2xx status without a readable envelope is a transport failure
/// - a 2xx body that is not an envelope, or lacks `data`, is invalid
pub(crate) fn decode_envelope(status: StatusCode, body: &[u8]) -> Result<Value, CatalogError> {
    let parsed = match serde_json::from_slice::<QueryResponse>(body) {
        Ok(QueryResponse {
            errors: Some(errors),
            ..
        }) if !errors.is_empty() => {
            return Err(CatalogError::remote(
                errors.into_iter().map(RemoteErrorDetail::from).collect(),
            ));
        }
        other => other,
    };

    if !status.is_success() {
        return Err(CatalogError::transport(format!(
            "HTTP {status}: {}",
            preview(body)
        )));
    }

    match parsed {
        Ok(QueryResponse {
            data: Some(data @ Value::Object(_)),
            ..
        }) => Ok(data),
        Ok(_) => Err(CatalogError::invalid_response(
            "response envelope has no data object",
        )),
        Err(e) => Err(CatalogError::invalid_response(format!(
            "response is not a query envelope: {e}"
        ))),
    }
}

/// Take the operation's top-level field out of `data`.
///
/// A present-but-null field is returned as `Value::Null`; callers decide
/// whether that means "not found".
pub(crate) fn take_field(mut data: Value, operation: Operation) -> Result<Value, CatalogError> {
    data.get_mut(operation.response_field())
        .map(Value::take)
        .ok_or_else(|| {
            CatalogError::invalid_response(format!(
                "response data has no '{}' field",
                operation.response_field()
            ))
        })
}

fn preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty body".to_owned();
    }
    trimmed.chars().take(BODY_PREVIEW_LEN).collect()
}
