use log::{debug, info, warn};
use serde_json::Value;

use crate::api::error::{ApiError, decode, decode_all};
use crate::models::household::{HouseId, PaintRecord, PaintRecordId};
use crate::models::requests::{NewPaintRecord, PaintRecordChanges};
use crate::models::rows::PaintRecordRow;
use crate::schema::{columns, embeds, tables};
use crate::store::{Direction, Embed, Query, Store};

const EMBEDS: &[Embed] = &[embeds::MANUFACTURER, embeds::LOCATION];
const LOCATION_CHECK: &[&str] = &[columns::ID, columns::NAME, columns::HOUSE_ID];

/// Most recently painted first.
pub fn list(store: &dyn Store, house_id: &HouseId) -> Result<Vec<PaintRecord>, ApiError> {
    let query = Query::all()
        .embed(EMBEDS)
        .eq(columns::HOUSE_ID, house_id.as_str())
        .order_by(columns::PAINTED_AT, Direction::Desc);
    let rows = store.select(tables::PAINT_RECORDS, &query)?;
    debug!("Paint: fetched {} record(s) for house {}", rows.len(), house_id);
    decode_all::<PaintRecordRow, PaintRecord>(rows)
}

/// Reads the referenced location first and fails with
/// [`ApiError::InvalidLocation`] before inserting anything if it does not
/// resolve to a room of the same house.
pub fn create(store: &dyn Store, new: &NewPaintRecord) -> Result<PaintRecord, ApiError> {
    new.validate()?;

    let check = Query::columns(LOCATION_CHECK).eq(columns::ID, new.location_id.as_str());
    let location = match store.select_single(tables::LOCATIONS, &check) {
        Ok(row) if !row.is_null() => row,
        Ok(_) => return Err(ApiError::InvalidLocation),
        Err(e) => {
            warn!("Paint: location {} did not resolve: {}", new.location_id, e);
            return Err(ApiError::InvalidLocation);
        }
    };
    if location.get(columns::HOUSE_ID).and_then(Value::as_str) != Some(new.house_id.as_str()) {
        warn!("Paint: location {} belongs to another house", new.location_id);
        return Err(ApiError::InvalidLocation);
    }

    let row = store.insert(tables::PAINT_RECORDS, &new.to_row(), EMBEDS)?;
    let record: PaintRecord = decode::<PaintRecordRow>(row)?.into();
    info!("Paint: created {} ({}) for house {}", record.color, record.id, record.house_id);
    Ok(record)
}

pub fn update(store: &dyn Store, id: &PaintRecordId, changes: &PaintRecordChanges) -> Result<PaintRecord, ApiError> {
    changes.validate()?;
    let row = store.update(tables::PAINT_RECORDS, id.as_str(), &changes.to_changes()?, EMBEDS)?;
    decode::<PaintRecordRow>(row).map(PaintRecord::from)
}

pub fn delete(store: &dyn Store, id: &PaintRecordId) -> Result<(), ApiError> {
    store.delete(tables::PAINT_RECORDS, id.as_str())?;
    info!("Paint: deleted {}", id);
    Ok(())
}
