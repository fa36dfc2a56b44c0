use log::debug;

use crate::api::error::{ApiError, decode, decode_all};
use crate::models::household::{HouseId, Location, LocationId};
use crate::models::requests::NewLocation;
use crate::models::rows::LocationRow;
use crate::schema::{columns, tables};
use crate::store::{Direction, Query, Store};

pub fn list(store: &dyn Store, house_id: &HouseId) -> Result<Vec<Location>, ApiError> {
    let query = Query::all()
        .eq(columns::HOUSE_ID, house_id.as_str())
        .order_by(columns::NAME, Direction::Asc);
    let rows = store.select(tables::LOCATIONS, &query)?;
    debug!("Locations: fetched {} row(s) for house {}", rows.len(), house_id);
    decode_all::<LocationRow, Location>(rows)
}

pub fn get(store: &dyn Store, id: &LocationId) -> Result<Location, ApiError> {
    let query = Query::all().eq(columns::ID, id.as_str());
    let row = store.select_single(tables::LOCATIONS, &query)?;
    decode::<LocationRow>(row).map(Location::from)
}

pub fn create(store: &dyn Store, new: &NewLocation) -> Result<Location, ApiError> {
    new.validate()?;
    let row = store.insert(tables::LOCATIONS, &new.to_row(), &[])?;
    decode::<LocationRow>(row).map(Location::from)
}
