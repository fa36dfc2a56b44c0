//! In-process store used by the tests.
//!
//! Behaves like the hosted gateway for the parts the crate relies on:
//! server-assigned ids and timestamps, foreign-key checks, cascade from
//! `houses`, embed resolution, single-row semantics. It also records every call
//! and can be told to fail the next call on a table with a given message.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use http::StatusCode;
use serde_json::{Map, Value, json};
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::schema::tables;
use crate::store::{Direction, Embed, Filter, Query, Store, StoreError};

const FOREIGN_KEYS: &[(&str, &str)] = &[
    ("house_id", tables::HOUSES),
    ("location_id", tables::LOCATIONS),
    ("manufacturer_id", tables::PAINT_MANUFACTURERS),
    ("service_type_id", tables::SERVICE_TYPES),
    ("recurrence_id", tables::RECURRENCES),
];

const NO_SINGLE_ROW: &str = "JSON object requested, multiple (or no) rows returned";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    Select,
    SelectSingle,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub table: String,
}

pub struct MemoryStore {
    tables: RefCell<BTreeMap<String, Vec<Value>>>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<Vec<(Op, String, String)>>,
    next_id: Cell<u64>,
    clock: Cell<DateTime<Utc>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            tables: RefCell::new(BTreeMap::new()),
            calls: RefCell::new(Vec::new()),
            failures: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            clock: Cell::new(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
        }
    }

    /// Reference rows with fixed ids: manufacturer `m1`, service type `st1`,
    /// recurrences `r-monthly` and `r-annual`.
    pub fn with_reference_data() -> Self {
        let store = MemoryStore::new();
        let ts = "2024-03-01T00:00:00.000Z";
        store.seed(
            tables::PAINT_MANUFACTURERS,
            json!([{ "id": "m1", "name": "Test Manufacturer", "description": null, "created_at": ts, "updated_at": ts }]),
        );
        store.seed(
            tables::SERVICE_TYPES,
            json!([{
                "id": "st1", "name": "HVAC Maintenance", "description": "Furnace check-up",
                "category": "hvac", "created_at": ts, "updated_at": ts
            }]),
        );
        store.seed(
            tables::RECURRENCES,
            json!([
                { "id": "r-monthly", "name": "Monthly", "value": "monthly", "description": null, "created_at": ts, "updated_at": ts },
                { "id": "r-annual", "name": "Annual", "value": "annual", "description": "Once a year", "created_at": ts, "updated_at": ts }
            ]),
        );
        store
    }

    /// Append raw rows to a table, bypassing every check.
    pub fn seed(&self, table: &str, rows: Value) {
        let rows = match rows {
            Value::Array(rows) => rows,
            other => vec![other],
        };
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.borrow().get(table).cloned().unwrap_or_default()
    }

    /// Make the next `op` on `table` fail with `message`.
    pub fn fail_next(&self, op: Op, table: &str, message: &str) {
        self.failures
            .borrow_mut()
            .push((op, table.to_string(), message.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, op: Op, table: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.op == op && c.table == table)
            .count()
    }

    fn enter(&self, op: Op, table: &str) -> Result<(), StoreError> {
        self.calls.borrow_mut().push(Call {
            op,
            table: table.to_string(),
        });
        let mut failures = self.failures.borrow_mut();
        if let Some(pos) = failures.iter().position(|(o, t, _)| *o == op && t == table) {
            let (_, _, message) = failures.remove(pos);
            return Err(StoreError::remote(StatusCode::BAD_REQUEST, message));
        }
        Ok(())
    }

    fn tick(&self) -> String {
        let now = self.clock.get() + Duration::seconds(1);
        self.clock.set(now);
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn find(&self, table: &str, id: &str) -> Option<Value> {
        self.tables
            .borrow()
            .get(table)?
            .iter()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .cloned()
    }

    fn check_foreign_keys(&self, table: &str, row: &Map<String, Value>) -> Result<(), StoreError> {
        for (column, target) in FOREIGN_KEYS {
            let Some(value) = row.get(*column) else { continue };
            if value.is_null() {
                continue;
            }
            let exists = value.as_str().is_some_and(|id| self.find(target, id).is_some());
            if !exists {
                return Err(StoreError::Remote {
                    status: StatusCode::CONFLICT,
                    code: Some("23503".to_string()),
                    message: format!(
                        "insert or update on table \"{}\" violates foreign key constraint \"{}_{}_fkey\"",
                        table, table, column
                    ),
                });
            }
        }
        Ok(())
    }

    fn resolve(&self, mut row: Value, embeds: &[Embed]) -> Value {
        if let Value::Object(map) = &mut row {
            for embed in embeds {
                let related = map
                    .get(embed.column)
                    .and_then(Value::as_str)
                    .and_then(|id| self.find(embed.table, id))
                    .unwrap_or(Value::Null);
                map.insert(embed.alias.to_string(), related);
            }
        }
        row
    }

    fn query_rows(&self, table: &str, query: &Query) -> Vec<Value> {
        let mut rows = self
            .tables
            .borrow()
            .get(table)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .collect::<Vec<_>>();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(&a[order.column], &b[order.column]);
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        rows.into_iter()
            .map(|row| self.resolve(row, query.embeds))
            .map(|row| match query.columns {
                Some(columns) => project(row, columns, query.embeds),
                None => row,
            })
            .collect()
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, value) => row.get(*column).and_then(Value::as_str) == Some(value.as_str()),
        Filter::NotNull(column) => row.get(*column).is_some_and(|v| !v.is_null()),
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn project(row: Value, columns: &[&str], embeds: &[Embed]) -> Value {
    match row {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| columns.contains(&k.as_str()) || embeds.iter().any(|e| e.alias == k.as_str()))
                .collect(),
        ),
        other => other,
    }
}

impl Store for MemoryStore {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.enter(Op::Select, table)?;
        Ok(self.query_rows(table, query))
    }

    fn select_single(&self, table: &str, query: &Query) -> Result<Value, StoreError> {
        self.enter(Op::SelectSingle, table)?;
        let mut rows = self.query_rows(table, query);
        if rows.len() != 1 {
            return Err(StoreError::remote(StatusCode::NOT_ACCEPTABLE, NO_SINGLE_ROW));
        }
        Ok(rows.remove(0))
    }

    fn insert(&self, table: &str, row: &Value, embeds: &'static [Embed]) -> Result<Value, StoreError> {
        self.enter(Op::Insert, table)?;
        let Value::Object(fields) = row else {
            return Err(StoreError::remote(StatusCode::BAD_REQUEST, "row must be a JSON object"));
        };
        self.check_foreign_keys(table, fields)?;

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let now = self.tick();

        let mut stored = fields.clone();
        stored.insert("id".to_string(), json!(format!("{}-{}", table, id)));
        stored.insert("created_at".to_string(), json!(now));
        stored.insert("updated_at".to_string(), json!(now));
        let stored = Value::Object(stored);

        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(self.resolve(stored, embeds))
    }

    fn update(&self, table: &str, id: &str, changes: &Value, embeds: &'static [Embed]) -> Result<Value, StoreError> {
        self.enter(Op::Update, table)?;
        let Value::Object(fields) = changes else {
            return Err(StoreError::remote(StatusCode::BAD_REQUEST, "changes must be a JSON object"));
        };
        if self.find(table, id).is_none() {
            return Err(StoreError::remote(StatusCode::NOT_ACCEPTABLE, NO_SINGLE_ROW));
        }
        self.check_foreign_keys(table, fields)?;

        let now = self.tick();
        let mut store = self.tables.borrow_mut();
        let rows = store.entry(table.to_string()).or_default();
        let row = rows
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| StoreError::remote(StatusCode::NOT_ACCEPTABLE, NO_SINGLE_ROW))?;
        if let Value::Object(map) = row {
            for (k, v) in fields {
                map.insert(k.clone(), v.clone());
            }
            map.insert("updated_at".to_string(), json!(now));
        }
        let updated = row.clone();
        drop(store);
        Ok(self.resolve(updated, embeds))
    }

    fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        self.enter(Op::Delete, table)?;
        let mut store = self.tables.borrow_mut();
        let rows = store.entry(table.to_string()).or_default();
        let before = rows.len();
        rows.retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        if rows.len() == before {
            return Err(StoreError::remote(StatusCode::NOT_ACCEPTABLE, NO_SINGLE_ROW));
        }
        if table == tables::HOUSES {
            for (name, rows) in store.iter_mut() {
                if name != tables::HOUSES {
                    rows.retain(|r| r.get("house_id").and_then(Value::as_str) != Some(id));
                }
            }
        }
        Ok(())
    }
}

/// Load a JSON fixture from `tests/data/`.
pub fn fixture(name: &str) -> Value {
    let path = format!("tests/data/{}", name);
    let json = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {} missing: {}", path, e));
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("fixture {} invalid: {}", path, e))
}
