//! The currently selected house and everything read through it.
//!
//! A `HouseSession` owns the selection and the list cache. Scoped reads need a
//! selected house and only ever return that house's rows. Creates stamp the
//! selected house on new rows; updates and deletes go by id. Every successful
//! write invalidates the one cache key of the house that owns the row.

use log::{debug, info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt;

use crate::api::error::{ApiError, decode};
use crate::api::{home_services, houses, locations, paint_records, plants, reference, reminders};
use crate::cache::{Cached, EntityKind, ListCache};
use crate::models::household::*;
use crate::models::requests::*;
use crate::schema::{columns, tables};
use crate::store::{Query, Store};

#[derive(Debug)]
pub enum SessionError {
    NoHouseSelected,
    UnknownHouse(HouseId),
    Api(ApiError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoHouseSelected => write!(f, "No house selected"),
            SessionError::UnknownHouse(id) => write!(f, "Unknown house: {}", id),
            SessionError::Api(e) => write!(f, "{}", e),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(value: ApiError) -> Self {
        SessionError::Api(value)
    }
}

type ScopedList<T> = fn(&dyn Store, &HouseId) -> Result<Vec<T>, ApiError>;

const OWNER_COLUMNS: &[&str] = &[columns::ID, columns::HOUSE_ID];

#[derive(Deserialize)]
struct OwnerRow {
    house_id: HouseId,
}

pub struct HouseSession<'s> {
    store: &'s dyn Store,
    cache: ListCache,
    houses: Vec<House>,
    current: Option<HouseId>,
    loaded: bool,
}

impl<'s> HouseSession<'s> {
    pub fn new(store: &'s dyn Store) -> Self {
        HouseSession {
            store,
            cache: ListCache::new(),
            houses: Vec::new(),
            current: None,
            loaded: false,
        }
    }

    pub fn cache(&self) -> &ListCache {
        &self.cache
    }

    // =====================
    // Selection
    // =====================

    /// Fetch the house list and settle the selection: a selection that no
    /// longer exists is dropped, and an empty selection falls to the first house.
    pub fn load_houses(&mut self) -> Result<&[House], SessionError> {
        let store = self.store;
        let houses = self.cache.get_or_fetch(None, || houses::list(store))?;
        self.houses = houses;
        self.loaded = true;

        if let Some(id) = &self.current {
            if !self.houses.iter().any(|h| &h.id == id) {
                debug!("Session: selected house {} is gone", id);
                self.current = None;
            }
        }
        if self.current.is_none() {
            if let Some(first) = self.houses.first() {
                info!("Session: selecting {} ({})", first.name, first.id);
                self.current = Some(first.id.clone());
            }
        }
        Ok(&self.houses)
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    /// True until the first house list has been loaded.
    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn current(&self) -> Option<&House> {
        let id = self.current.as_ref()?;
        self.houses.iter().find(|h| &h.id == id)
    }

    pub fn current_id(&self) -> Option<&HouseId> {
        self.current.as_ref()
    }

    pub fn select(&mut self, id: &HouseId) -> Result<&House, SessionError> {
        let house = self
            .houses
            .iter()
            .find(|h| &h.id == id)
            .ok_or_else(|| SessionError::UnknownHouse(id.clone()))?;
        info!("Session: selecting {} ({})", house.name, house.id);
        self.current = Some(house.id.clone());
        Ok(house)
    }

    fn require_house(&self) -> Result<HouseId, SessionError> {
        self.current.clone().ok_or(SessionError::NoHouseSelected)
    }

    // =====================
    // Houses
    // =====================

    /// The house stays listed even when one of its rooms fails to save; the
    /// room error is returned after the house list has been reloaded.
    pub fn create_house(&mut self, new: &NewHouse) -> Result<House, SessionError> {
        let house = houses::create(self.store, new)?;
        self.cache.invalidate(EntityKind::Houses, None);

        let rooms = self.create_rooms(&house.id, &new.rooms);
        self.cache.invalidate(EntityKind::Locations, Some(&house.id));
        self.load_houses()?;
        if let Err(e) = rooms {
            warn!("Session: house {} saved without all of its rooms: {}", house.id, e);
            return Err(e.into());
        }
        Ok(house)
    }

    fn create_rooms(&self, house: &HouseId, rooms: &[String]) -> Result<(), ApiError> {
        for room in rooms {
            let location = NewLocation {
                name: room.clone(),
                description: None,
                house_id: house.clone(),
            };
            locations::create(self.store, &location)?;
        }
        Ok(())
    }

    pub fn update_house(&mut self, id: &HouseId, changes: &HouseChanges) -> Result<House, SessionError> {
        let house = houses::update(self.store, id, changes)?;
        self.cache.invalidate(EntityKind::Houses, None);
        self.load_houses()?;
        Ok(house)
    }

    /// The store removes the house's records with it; deleting the selected
    /// house moves the selection to the first remaining one.
    pub fn delete_house(&mut self, id: &HouseId) -> Result<(), SessionError> {
        houses::delete(self.store, id)?;
        self.cache.invalidate(EntityKind::Houses, None);
        self.cache.invalidate_house(id);
        if self.current.as_ref() == Some(id) {
            self.current = None;
        }
        self.load_houses()?;
        if self.current.is_none() {
            warn!("Session: no houses left after deleting {}", id);
        }
        Ok(())
    }

    // =====================
    // Scoped reads
    // =====================

    fn scoped<T>(&mut self, list: ScopedList<T>) -> Result<Vec<T>, SessionError>
    where
        T: Cached + HouseOwned,
    {
        let house = self.require_house()?;
        let store = self.store;
        let rows = self.cache.get_or_fetch(Some(&house), || list(store, &house))?;
        Ok(rows.into_iter().filter(|r| r.house_id() == &house).collect())
    }

    pub fn locations(&mut self) -> Result<Vec<Location>, SessionError> {
        self.scoped(locations::list)
    }

    pub fn paint_records(&mut self) -> Result<Vec<PaintRecord>, SessionError> {
        self.scoped(paint_records::list)
    }

    pub fn home_services(&mut self) -> Result<Vec<HomeService>, SessionError> {
        self.scoped(home_services::list)
    }

    pub fn plants(&mut self) -> Result<Vec<Plant>, SessionError> {
        self.scoped(plants::list)
    }

    pub fn reminders(&mut self) -> Result<Vec<Reminder>, SessionError> {
        self.scoped(reminders::list)
    }

    // =====================
    // Reference reads
    // =====================

    pub fn manufacturers(&mut self) -> Result<Vec<PaintManufacturer>, SessionError> {
        let store = self.store;
        Ok(self.cache.get_or_fetch(None, || reference::paint_manufacturers(store))?)
    }

    pub fn service_types(&mut self) -> Result<Vec<ServiceType>, SessionError> {
        let store = self.store;
        Ok(self.cache.get_or_fetch(None, || reference::service_types(store))?)
    }

    pub fn recurrences(&mut self) -> Result<Vec<Recurrence>, SessionError> {
        let store = self.store;
        Ok(self.cache.get_or_fetch(None, || reference::recurrences(store))?)
    }

    pub fn plant_type_options(&self) -> Result<Vec<SelectOption>, SessionError> {
        Ok(plants::type_options(self.store)?)
    }

    pub fn sun_options(&self) -> Result<Vec<SelectOption>, SessionError> {
        Ok(plants::sun_options(self.store)?)
    }

    // =====================
    // Scoped writes
    // =====================

    /// Run a create for the selected house and invalidate `(kind, house)`
    /// only if it succeeded.
    fn insert<T>(
        &mut self,
        kind: EntityKind,
        op: impl FnOnce(&dyn Store, &HouseId) -> Result<T, ApiError>,
    ) -> Result<T, SessionError> {
        let house = self.require_house()?;
        let result = op(self.store, &house)?;
        self.cache.invalidate(kind, Some(&house));
        Ok(result)
    }

    /// Run an update and invalidate the list of the house owning the returned row.
    fn change<T: HouseOwned>(
        &mut self,
        kind: EntityKind,
        op: impl FnOnce(&dyn Store) -> Result<T, ApiError>,
    ) -> Result<T, SessionError> {
        let row = op(self.store)?;
        self.cache.invalidate(kind, Some(row.house_id()));
        Ok(row)
    }

    /// Look up the owning house of `id`, delete it, then invalidate that
    /// house's list. A failed lookup deletes nothing.
    fn remove(
        &mut self,
        kind: EntityKind,
        table: &'static str,
        id: &str,
        op: impl FnOnce(&dyn Store) -> Result<(), ApiError>,
    ) -> Result<(), SessionError> {
        let house = self.owner_of(table, id)?;
        op(self.store)?;
        self.cache.invalidate(kind, Some(&house));
        Ok(())
    }

    fn owner_of(&self, table: &'static str, id: &str) -> Result<HouseId, ApiError> {
        let query = Query::columns(OWNER_COLUMNS).eq(columns::ID, id);
        let row = self.store.select_single(table, &query)?;
        Ok(decode::<OwnerRow>(row)?.house_id)
    }

    pub fn create_location(&mut self, mut new: NewLocation) -> Result<Location, SessionError> {
        self.insert(EntityKind::Locations, |store, house| {
            new.house_id = house.clone();
            locations::create(store, &new)
        })
    }

    pub fn create_paint_record(&mut self, mut new: NewPaintRecord) -> Result<PaintRecord, SessionError> {
        self.insert(EntityKind::PaintRecords, |store, house| {
            new.house_id = house.clone();
            paint_records::create(store, &new)
        })
    }

    pub fn update_paint_record(
        &mut self,
        id: &PaintRecordId,
        changes: &PaintRecordChanges,
    ) -> Result<PaintRecord, SessionError> {
        self.change(EntityKind::PaintRecords, |store| paint_records::update(store, id, changes))
    }

    pub fn delete_paint_record(&mut self, id: &PaintRecordId) -> Result<(), SessionError> {
        self.remove(EntityKind::PaintRecords, tables::PAINT_RECORDS, id.as_str(), |store| {
            paint_records::delete(store, id)
        })
    }

    pub fn create_home_service(&mut self, mut new: NewHomeService) -> Result<HomeService, SessionError> {
        self.insert(EntityKind::HomeServices, |store, house| {
            new.house_id = house.clone();
            home_services::create(store, &new)
        })
    }

    pub fn update_home_service(
        &mut self,
        id: &HomeServiceId,
        changes: &HomeServiceChanges,
    ) -> Result<HomeService, SessionError> {
        self.change(EntityKind::HomeServices, |store| home_services::update(store, id, changes))
    }

    pub fn delete_home_service(&mut self, id: &HomeServiceId) -> Result<(), SessionError> {
        self.remove(EntityKind::HomeServices, tables::HOME_SERVICES, id.as_str(), |store| {
            home_services::delete(store, id)
        })
    }

    pub fn create_plant(&mut self, mut new: NewPlant) -> Result<Plant, SessionError> {
        self.insert(EntityKind::Plants, |store, house| {
            new.house_id = house.clone();
            plants::create(store, &new)
        })
    }

    pub fn update_plant(&mut self, id: &PlantId, changes: &PlantChanges) -> Result<Plant, SessionError> {
        self.change(EntityKind::Plants, |store| plants::update(store, id, changes))
    }

    pub fn delete_plant(&mut self, id: &PlantId) -> Result<(), SessionError> {
        self.remove(EntityKind::Plants, tables::PLANTS, id.as_str(), |store| plants::delete(store, id))
    }

    pub fn create_reminder(&mut self, mut new: NewReminder) -> Result<Reminder, SessionError> {
        self.insert(EntityKind::Reminders, |store, house| {
            new.house_id = house.clone();
            reminders::create(store, &new)
        })
    }

    pub fn update_reminder(&mut self, id: &ReminderId, changes: &ReminderChanges) -> Result<Reminder, SessionError> {
        self.change(EntityKind::Reminders, |store| reminders::update(store, id, changes))
    }

    pub fn complete_reminder(&mut self, id: &ReminderId) -> Result<Reminder, SessionError> {
        self.change(EntityKind::Reminders, |store| reminders::complete(store, id))
    }

    pub fn delete_reminder(&mut self, id: &ReminderId) -> Result<(), SessionError> {
        self.remove(EntityKind::Reminders, tables::REMINDERS, id.as_str(), |store| reminders::delete(store, id))
    }
}
