//! HTTP client for the hosted store's REST gateway (PostgREST dialect).
//!
//! - Blocking client using `ureq` (no async).
//! - Every request carries the access key both as `apikey` and as a bearer
//!   token, which is what hosted gateways expect for anonymous-key access.
//! - Single-row operations ask for `application/vnd.pgrst.object+json`, so the
//!   gateway itself rejects updates/deletes that match no row.
//!
//! Filters render as `column=eq.value` / `column=not.is.null`, ordering as
//! `order=column.asc`, embeds as `select=*,alias:table!fk_column(*)`.

use log::debug;
use serde_json::Value;
use std::time::Duration;

use crate::store::{Direction, Embed, Filter, Query, Store, StoreError};

const REST_PATH: &str = "/rest/v1";
const ACCEPT_ROWS: &str = "application/json";
const ACCEPT_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

pub struct RestStore {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();
        RestStore {
            agent: config.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, REST_PATH, table)
    }

    fn prepare<B>(&self, req: ureq::RequestBuilder<B>, accept: &str, pairs: &[(String, String)]) -> ureq::RequestBuilder<B> {
        let mut req = req
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Accept", accept)
            .header("User-Agent", concat!("household/", env!("CARGO_PKG_VERSION")));
        for (k, v) in pairs {
            req = req.query(k, v);
        }
        req
    }

    fn finish(
        op: &str,
        table: &str,
        result: Result<http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<Value, StoreError> {
        let mut response = result.map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = StoreError::from_body(status, &body);
            debug!("{} {} failed: http {}: {}", op, table, status.as_u16(), err);
            return Err(err);
        }
        debug!("{} {} -> http {}", op, table, status.as_u16());

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// `*` (or the explicit column list) followed by one `alias:table!column(*)`
/// per embed.
pub fn render_select(columns: Option<&[&str]>, embeds: &[Embed]) -> String {
    let mut parts = match columns {
        Some(cols) => cols.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        None => vec!["*".to_string()],
    };
    parts.extend(
        embeds
            .iter()
            .map(|e| format!("{}:{}!{}(*)", e.alias, e.table, e.column)),
    );
    parts.join(",")
}

pub fn query_pairs(query: &Query) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_string(), render_select(query.columns, query.embeds))];
    for filter in &query.filters {
        match filter {
            Filter::Eq(column, value) => pairs.push((column.to_string(), format!("eq.{}", value))),
            Filter::NotNull(column) => pairs.push((column.to_string(), "not.is.null".to_string())),
        }
    }
    if let Some(order) = &query.order {
        let dir = match order.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        pairs.push(("order".to_string(), format!("{}.{}", order.column, dir)));
    }
    pairs
}

fn id_pairs(id: &str, embeds: &[Embed]) -> Vec<(String, String)> {
    vec![
        ("id".to_string(), format!("eq.{}", id)),
        ("select".to_string(), render_select(None, embeds)),
    ]
}

impl Store for RestStore {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let req = self.prepare(self.agent.get(&self.url(table)), ACCEPT_ROWS, &query_pairs(query));
        match Self::finish("select", table, req.call())? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    fn select_single(&self, table: &str, query: &Query) -> Result<Value, StoreError> {
        let req = self.prepare(self.agent.get(&self.url(table)), ACCEPT_OBJECT, &query_pairs(query));
        Self::finish("select", table, req.call())
    }

    fn insert(&self, table: &str, row: &Value, embeds: &'static [Embed]) -> Result<Value, StoreError> {
        let pairs = vec![("select".to_string(), render_select(None, embeds))];
        let req = self
            .prepare(self.agent.post(&self.url(table)), ACCEPT_OBJECT, &pairs)
            .header("Prefer", RETURN_REPRESENTATION);
        Self::finish("insert", table, req.send_json(row))
    }

    fn update(&self, table: &str, id: &str, changes: &Value, embeds: &'static [Embed]) -> Result<Value, StoreError> {
        let req = self
            .prepare(self.agent.patch(&self.url(table)), ACCEPT_OBJECT, &id_pairs(id, embeds))
            .header("Prefer", RETURN_REPRESENTATION);
        Self::finish("update", table, req.send_json(changes))
    }

    fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let req = self
            .prepare(self.agent.delete(&self.url(table)), ACCEPT_OBJECT, &id_pairs(id, &[]))
            .header("Prefer", RETURN_REPRESENTATION);
        Self::finish("delete", table, req.call()).map(|_| ())
    }
}
