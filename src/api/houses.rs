use log::{debug, info};

use crate::api::error::{ApiError, decode, decode_all};
use crate::models::household::{House, HouseId};
use crate::models::requests::{HouseChanges, NewHouse};
use crate::models::rows::HouseRow;
use crate::schema::{columns, tables};
use crate::store::{Direction, Query, Store};

pub fn list(store: &dyn Store) -> Result<Vec<House>, ApiError> {
    let query = Query::all().order_by(columns::NAME, Direction::Asc);
    let rows = store.select(tables::HOUSES, &query)?;
    debug!("Houses: fetched {} row(s)", rows.len());
    decode_all::<HouseRow, House>(rows)
}

/// Insert the house row only; rooms are created by the caller.
pub fn create(store: &dyn Store, new: &NewHouse) -> Result<House, ApiError> {
    new.validate()?;
    let row = store.insert(tables::HOUSES, &new.to_row(), &[])?;
    let house: House = decode::<HouseRow>(row)?.into();
    info!("Houses: created {} ({})", house.name, house.id);
    Ok(house)
}

pub fn update(store: &dyn Store, id: &HouseId, changes: &HouseChanges) -> Result<House, ApiError> {
    changes.validate()?;
    let row = store.update(tables::HOUSES, id.as_str(), &changes.to_changes()?, &[])?;
    decode::<HouseRow>(row).map(House::from)
}

pub fn delete(store: &dyn Store, id: &HouseId) -> Result<(), ApiError> {
    store.delete(tables::HOUSES, id.as_str())?;
    info!("Houses: deleted {}", id);
    Ok(())
}
