//! Query gateway: sends named operations to the remote service and returns
//! the `data` payload or a [`CatalogError`].

mod client;
pub(crate) mod dto;
mod envelope;
mod operations;

use animals_catalog_sdk::CatalogError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use client::{GraphQlClient, GraphQlClientBuilder, TransportSecurity};
pub use operations::{
    Operation, animal_id_variables, animals_variables, no_variables, person_id_variables,
    persons_variables,
};

/// Executes one named operation and yields its `data` object.
///
/// Implementations must not retry. A response carrying an `errors` array
/// fails with [`CatalogError::Remote`] even when partial data is present.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, operation: Operation, variables: Value) -> Result<Value, CatalogError>;
}

/// Execute `operation` and decode its top-level field.
///
/// Returns `Ok(None)` when the field is present but null.
pub(crate) async fn fetch_field<T: DeserializeOwned>(
    executor: &dyn QueryExecutor,
    operation: Operation,
    variables: Value,
) -> Result<Option<T>, CatalogError> {
    let data = executor.execute(operation, variables).await?;
    let field = envelope::take_field(data, operation)?;
    if field.is_null() {
        return Ok(None);
    }
    serde_json::from_value(field).map(Some).map_err(|e| {
        CatalogError::invalid_response(format!(
            "unexpected shape of '{}': {e}",
            operation.response_field()
        ))
    })
}
