//! Global, read-only lookup tables shared by every house.

use log::debug;

use crate::api::error::{ApiError, decode_all};
use crate::models::household::{PaintManufacturer, Recurrence, ServiceType};
use crate::models::rows::{ManufacturerRow, RecurrenceRow, ServiceTypeRow};
use crate::schema::{columns, tables};
use crate::store::{Direction, Query, Store};

fn by_name() -> Query {
    Query::all().order_by(columns::NAME, Direction::Asc)
}

pub fn paint_manufacturers(store: &dyn Store) -> Result<Vec<PaintManufacturer>, ApiError> {
    let rows = store.select(tables::PAINT_MANUFACTURERS, &by_name())?;
    debug!("Reference: {} paint manufacturer(s)", rows.len());
    decode_all::<ManufacturerRow, PaintManufacturer>(rows)
}

pub fn service_types(store: &dyn Store) -> Result<Vec<ServiceType>, ApiError> {
    let rows = store.select(tables::SERVICE_TYPES, &by_name())?;
    debug!("Reference: {} service type(s)", rows.len());
    decode_all::<ServiceTypeRow, ServiceType>(rows)
}

pub fn recurrences(store: &dyn Store) -> Result<Vec<Recurrence>, ApiError> {
    let rows = store.select(tables::RECURRENCES, &by_name())?;
    debug!("Reference: {} recurrence(s)", rows.len());
    decode_all::<RecurrenceRow, Recurrence>(rows)
}
