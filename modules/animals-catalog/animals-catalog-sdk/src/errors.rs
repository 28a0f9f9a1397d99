//! Public error types for the animals catalog.
//!
//! These errors are safe to expose to consumers and are `Clone` so that
//! list and statistics state can keep the failure that stopped them.

use thiserror::Error;

/// One entry of the `errors` array of a query response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteErrorDetail {
    pub message: String,
    /// Response path the error refers to, joined with `.` (e.g. `animals.items.0`).
    pub path: Option<String>,
}

/// Errors that can be returned by the catalog data layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No usable response was received (connection, timeout, non-2xx status
    /// without a query envelope).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// A response was received and it carried a structured error payload.
    #[error("Remote error: {}", join_messages(.errors))]
    Remote { errors: Vec<RemoteErrorDetail> },

    /// Well-formed response, but the requested record is absent.
    #[error("{entity} not found")]
    NotFound { entity: String },

    /// The response could not be decoded into the expected shape.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl CatalogError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn remote(errors: Vec<RemoteErrorDetail>) -> Self {
        Self::Remote { errors }
    }

    /// Create a `NotFound` error for `kind` identified by `id`.
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: format!("{kind} {id}"),
        }
    }

    /// Create a `NotFound` error for an aggregate record without identity.
    pub fn record_missing(field: &str) -> Self {
        Self::NotFound {
            entity: field.to_owned(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Human-readable message suitable for an error view.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { .. } => "The catalog service could not be reached.".to_owned(),
            Self::Remote { errors } => match errors.first() {
                Some(first) => format!("The catalog service reported an error: {}", first.message),
                None => "The catalog service reported an error.".to_owned(),
            },
            Self::NotFound { entity } => format!("No record found for {entity}."),
            Self::InvalidResponse { .. } => {
                "The catalog service returned data that could not be read.".to_owned()
            }
        }
    }
}

fn join_messages(errors: &[RemoteErrorDetail]) -> String {
    if errors.is_empty() {
        return "unspecified".to_owned();
    }
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
