use log::{debug, info};
use serde_json::Value;

use crate::api::error::{ApiError, decode, decode_all};
use crate::models::household::{HouseId, Plant, PlantId, SelectOption};
use crate::models::requests::{NewPlant, PlantChanges};
use crate::models::rows::PlantRow;
use crate::schema::{columns, embeds, tables};
use crate::store::{Direction, Embed, Query, Store};
use crate::utils::title_case;

const EMBEDS: &[Embed] = &[embeds::LOCATION];

pub fn list(store: &dyn Store, house_id: &HouseId) -> Result<Vec<Plant>, ApiError> {
    let query = Query::all()
        .embed(EMBEDS)
        .eq(columns::HOUSE_ID, house_id.as_str())
        .order_by(columns::NAME, Direction::Asc);
    let rows = store.select(tables::PLANTS, &query)?;
    debug!("Plants: fetched {} row(s) for house {}", rows.len(), house_id);
    decode_all::<PlantRow, Plant>(rows)
}

pub fn create(store: &dyn Store, new: &NewPlant) -> Result<Plant, ApiError> {
    new.validate()?;
    let row = store.insert(tables::PLANTS, &new.to_row(), EMBEDS)?;
    let plant: Plant = decode::<PlantRow>(row)?.into();
    info!("Plants: added {} ({}) to house {}", plant.name, plant.id, plant.house_id);
    Ok(plant)
}

pub fn update(store: &dyn Store, id: &PlantId, changes: &PlantChanges) -> Result<Plant, ApiError> {
    changes.validate()?;
    let row = store.update(tables::PLANTS, id.as_str(), &changes.to_changes()?, EMBEDS)?;
    decode::<PlantRow>(row).map(Plant::from)
}

pub fn delete(store: &dyn Store, id: &PlantId) -> Result<(), ApiError> {
    store.delete(tables::PLANTS, id.as_str())?;
    info!("Plants: deleted {}", id);
    Ok(())
}

/// Plant types already in use, as select options.
pub fn type_options(store: &dyn Store) -> Result<Vec<SelectOption>, ApiError> {
    const COLUMNS: &[&str] = &[columns::TYPE];
    distinct_options(store, COLUMNS)
}

/// Sun requirements already in use, as select options.
pub fn sun_options(store: &dyn Store) -> Result<Vec<SelectOption>, ApiError> {
    const COLUMNS: &[&str] = &[columns::SUN_REQUIREMENTS];
    distinct_options(store, COLUMNS)
}

fn distinct_options(store: &dyn Store, column: &'static [&'static str]) -> Result<Vec<SelectOption>, ApiError> {
    let name = column[0];
    let query = Query::columns(column)
        .not_null(name)
        .order_by(name, Direction::Asc);
    let rows = store.select(tables::PLANTS, &query)?;

    let mut values = rows
        .iter()
        .filter_map(|row| row.get(name).and_then(Value::as_str))
        .map(str::to_string)
        .collect::<Vec<_>>();
    values.sort();
    values.dedup();
    debug!("Plants: {} distinct value(s) for {}", values.len(), name);

    Ok(values
        .into_iter()
        .map(|value| SelectOption {
            label: title_case(&value),
            value,
        })
        .collect())
}
