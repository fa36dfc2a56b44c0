use core::fmt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::models::requests::ValidationError;
use crate::store::StoreError;

/// Errors surfaced by the data-access functions. None of them are recovered
/// from locally; `Store` displays the store's own message unchanged.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    /// The location referenced by a new paint record does not resolve.
    InvalidLocation,
    Validation(ValidationError),
    /// A row did not have the expected shape; `path` points at the offending field.
    Decode { path: String, source: serde_json::Error },
    /// A mutation succeeded but the store did not return the row.
    MissingRow,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Store(e) => write!(f, "{}", e),
            ApiError::InvalidLocation => write!(f, "Invalid location selected"),
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::Decode { path, source } => write!(f, "unexpected row shape at {}: {}", path, source),
            ApiError::MissingRow => write!(f, "the store did not return the affected row"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiError::Store(e) => Some(e),
            ApiError::Validation(e) => Some(e),
            ApiError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        ApiError::Store(value)
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Validation(value)
    }
}

/// Decode one wire row, keeping the JSON path of the first mismatch.
pub fn decode<T: DeserializeOwned>(row: Value) -> Result<T, ApiError> {
    if row.is_null() {
        return Err(ApiError::MissingRow);
    }
    serde_path_to_error::deserialize(row).map_err(|e| ApiError::Decode {
        path: e.path().to_string(),
        source: e.into_inner(),
    })
}

/// Decode and map every row, preserving order.
pub fn decode_all<R, T>(rows: Vec<Value>) -> Result<Vec<T>, ApiError>
where
    R: DeserializeOwned,
    T: From<R>,
{
    rows.into_iter()
        .map(|row| decode::<R>(row).map(T::from))
        .collect()
}
