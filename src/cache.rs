//! Per-(entity, house) cache of list results.
//!
//! Entries are replaced wholesale on fetch and dropped by key after a
//! successful mutation; nothing is patched in place.

use log::debug;
use std::collections::HashMap;
use std::fmt;

use crate::models::household::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Houses,
    Locations,
    PaintRecords,
    HomeServices,
    Plants,
    Reminders,
    PaintManufacturers,
    ServiceTypes,
    Recurrences,
}

impl EntityKind {
    pub const HOUSE_SCOPED: [EntityKind; 5] = [
        EntityKind::Locations,
        EntityKind::PaintRecords,
        EntityKind::HomeServices,
        EntityKind::Plants,
        EntityKind::Reminders,
    ];

    /// Singular noun used in prompts and failure messages.
    pub fn noun(self) -> &'static str {
        match self {
            EntityKind::Houses => "house",
            EntityKind::Locations => "room",
            EntityKind::PaintRecords => "paint record",
            EntityKind::HomeServices => "service",
            EntityKind::Plants => "plant",
            EntityKind::Reminders => "reminder",
            EntityKind::PaintManufacturers => "manufacturer",
            EntityKind::ServiceTypes => "service type",
            EntityKind::Recurrences => "recurrence",
        }
    }

    /// Kebab-case name accepted on the command line.
    pub fn from_name(name: &str) -> Option<EntityKind> {
        let kind = match name {
            "houses" | "house" => EntityKind::Houses,
            "locations" | "location" | "rooms" | "room" => EntityKind::Locations,
            "paint-records" | "paint-record" | "paint" => EntityKind::PaintRecords,
            "home-services" | "home-service" | "services" | "service" => EntityKind::HomeServices,
            "plants" | "plant" => EntityKind::Plants,
            "reminders" | "reminder" => EntityKind::Reminders,
            "paint-manufacturers" | "manufacturers" => EntityKind::PaintManufacturers,
            "service-types" => EntityKind::ServiceTypes,
            "recurrences" => EntityKind::Recurrences,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_house_scoped(self) -> bool {
        EntityKind::HOUSE_SCOPED.contains(&self)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: EntityKind,
    /// `None` for houses and the reference tables.
    pub house: Option<HouseId>,
}

#[derive(Debug, Clone)]
pub enum Listing {
    Houses(Vec<House>),
    Locations(Vec<Location>),
    PaintRecords(Vec<PaintRecord>),
    HomeServices(Vec<HomeService>),
    Plants(Vec<Plant>),
    Reminders(Vec<Reminder>),
    PaintManufacturers(Vec<PaintManufacturer>),
    ServiceTypes(Vec<ServiceType>),
    Recurrences(Vec<Recurrence>),
}

/// A view model that can be stored in the cache under its own kind.
pub trait Cached: Clone + Sized {
    const KIND: EntityKind;
    fn wrap(rows: Vec<Self>) -> Listing;
    fn unwrap(listing: &Listing) -> Option<&Vec<Self>>;
}

macro_rules! cached {
    ($($ty:ty => $variant:ident,)+) => {
        $(
            impl Cached for $ty {
                const KIND: EntityKind = EntityKind::$variant;

                fn wrap(rows: Vec<Self>) -> Listing {
                    Listing::$variant(rows)
                }

                fn unwrap(listing: &Listing) -> Option<&Vec<Self>> {
                    match listing {
                        Listing::$variant(rows) => Some(rows),
                        _ => None,
                    }
                }
            }
        )+
    };
}

cached! {
    House => Houses,
    Location => Locations,
    PaintRecord => PaintRecords,
    HomeService => HomeServices,
    Plant => Plants,
    Reminder => Reminders,
    PaintManufacturer => PaintManufacturers,
    ServiceType => ServiceTypes,
    Recurrence => Recurrences,
}

#[derive(Debug, Default)]
pub struct ListCache {
    entries: HashMap<CacheKey, Listing>,
}

impl ListCache {
    pub fn new() -> Self {
        ListCache::default()
    }

    /// Return the cached list for `(T::KIND, house)`, calling `fetch` and
    /// storing its result on a miss. Errors are returned and not cached.
    pub fn get_or_fetch<T, E, F>(&mut self, house: Option<&HouseId>, fetch: F) -> Result<Vec<T>, E>
    where
        T: Cached,
        F: FnOnce() -> Result<Vec<T>, E>,
    {
        let key = CacheKey {
            kind: T::KIND,
            house: house.cloned(),
        };
        if let Some(rows) = self.entries.get(&key).and_then(T::unwrap) {
            debug!("Cache: hit {} for {:?}", T::KIND, key.house);
            return Ok(rows.clone());
        }
        let rows = fetch()?;
        debug!("Cache: stored {} {}(s) for {:?}", rows.len(), T::KIND, key.house);
        self.entries.insert(key, T::wrap(rows.clone()));
        Ok(rows)
    }

    pub fn is_cached(&self, kind: EntityKind, house: Option<&HouseId>) -> bool {
        self.entries.contains_key(&CacheKey {
            kind,
            house: house.cloned(),
        })
    }

    /// Drop exactly one key.
    pub fn invalidate(&mut self, kind: EntityKind, house: Option<&HouseId>) {
        let key = CacheKey {
            kind,
            house: house.cloned(),
        };
        if self.entries.remove(&key).is_some() {
            debug!("Cache: invalidated {} for {:?}", kind, key.house);
        }
    }

    /// Drop every key scoped to `house`.
    pub fn invalidate_house(&mut self, house: &HouseId) {
        self.entries.retain(|key, _| key.house.as_ref() != Some(house));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
