//! The remote store surface the data-access layer talks to.
//!
//! A store exposes four operations per table: `select` (optionally filtered by
//! equality / not-null and ordered), `insert` and `update` (both returning the
//! affected row, optionally with embedded related rows) and `delete`.
//! `client::RestStore` implements it over HTTP; tests use `store::memory`.

use http::StatusCode;
use serde_json::Value;
use std::fmt;

#[cfg(test)]
pub mod memory;

/// A related row embedded into the result under `alias`, resolved through the
/// foreign-key `column` of the queried table into `table`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Embed {
    pub alias: &'static str,
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(&'static str, String),
    NotNull(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub direction: Direction,
}

/// Read request for a single table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    /// Explicit column list; `None` selects every column.
    pub columns: Option<&'static [&'static str]>,
    pub embeds: &'static [Embed],
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn all() -> Self {
        Query::default()
    }

    pub fn columns(columns: &'static [&'static str]) -> Self {
        Query {
            columns: Some(columns),
            ..Query::default()
        }
    }

    pub fn embed(mut self, embeds: &'static [Embed]) -> Self {
        self.embeds = embeds;
        self
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    pub fn not_null(mut self, column: &'static str) -> Self {
        self.filters.push(Filter::NotNull(column));
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order = Some(Order { column, direction });
        self
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    Transport(String),
    /// The store answered with an error; `message` is its text verbatim.
    Remote {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    /// The store answered with a body that is not JSON.
    Json(serde_json::Error),
}

impl StoreError {
    pub fn remote(status: StatusCode, message: impl Into<String>) -> Self {
        StoreError::Remote {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Build a remote error from a response body. PostgREST sends
    /// `{"code", "message", "details", "hint"}`; anything else is kept verbatim.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct Body {
            #[serde(default)]
            code: Option<String>,
            #[serde(default)]
            message: Option<String>,
        }

        match serde_json::from_str::<Body>(body) {
            Ok(Body {
                code,
                message: Some(message),
            }) => StoreError::Remote { status, code, message },
            _ => {
                let trimmed = body.trim();
                let message = if trimmed.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    trimmed.to_string()
                };
                StoreError::Remote {
                    status,
                    code: None,
                    message,
                }
            }
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Transport(s) => write!(f, "transport error: {}", s),
            StoreError::Remote { message, .. } => f.write_str(message),
            StoreError::Json(e) => write!(f, "invalid response body: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        StoreError::Json(value)
    }
}

pub trait Store {
    /// All rows matching `query`, in the requested order.
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Exactly one row matching `query`; zero or several rows is an error.
    fn select_single(&self, table: &str, query: &Query) -> Result<Value, StoreError>;

    /// Insert one row and return it as stored, with `embeds` resolved.
    fn insert(&self, table: &str, row: &Value, embeds: &'static [Embed]) -> Result<Value, StoreError>;

    /// Apply `changes` to the row with `id` and return it as stored.
    fn update(&self, table: &str, id: &str, changes: &Value, embeds: &'static [Embed]) -> Result<Value, StoreError>;

    /// Delete the row with `id`; a missing row is an error.
    fn delete(&self, table: &str, id: &str) -> Result<(), StoreError>;
}
