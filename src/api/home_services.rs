use log::{debug, info};

use crate::api::error::{ApiError, decode, decode_all};
use crate::models::household::{HomeService, HomeServiceId, HouseId};
use crate::models::requests::{HomeServiceChanges, NewHomeService};
use crate::models::rows::HomeServiceRow;
use crate::schema::{columns, embeds, tables};
use crate::store::{Direction, Embed, Query, Store};

const EMBEDS: &[Embed] = &[embeds::SERVICE_TYPE, embeds::RECURRENCE];

/// Earliest service date first.
pub fn list(store: &dyn Store, house_id: &HouseId) -> Result<Vec<HomeService>, ApiError> {
    let query = Query::all()
        .embed(EMBEDS)
        .eq(columns::HOUSE_ID, house_id.as_str())
        .order_by(columns::DATE, Direction::Asc);
    let rows = store.select(tables::HOME_SERVICES, &query)?;
    debug!("Services: fetched {} row(s) for house {}", rows.len(), house_id);
    decode_all::<HomeServiceRow, HomeService>(rows)
}

pub fn create(store: &dyn Store, new: &NewHomeService) -> Result<HomeService, ApiError> {
    new.validate()?;
    let row = store.insert(tables::HOME_SERVICES, &new.to_row(), EMBEDS)?;
    let service: HomeService = decode::<HomeServiceRow>(row)?.into();
    info!(
        "Services: scheduled {} with {} on {} ({})",
        service.service_name(),
        service.provider,
        service.date,
        service.id
    );
    Ok(service)
}

pub fn update(store: &dyn Store, id: &HomeServiceId, changes: &HomeServiceChanges) -> Result<HomeService, ApiError> {
    changes.validate()?;
    let row = store.update(tables::HOME_SERVICES, id.as_str(), &changes.to_changes()?, EMBEDS)?;
    decode::<HomeServiceRow>(row).map(HomeService::from)
}

pub fn delete(store: &dyn Store, id: &HomeServiceId) -> Result<(), ApiError> {
    store.delete(tables::HOME_SERVICES, id.as_str())?;
    info!("Services: deleted {}", id);
    Ok(())
}
