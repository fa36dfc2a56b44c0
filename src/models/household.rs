//! Application-side view models for the household store.
//!
//! These are the shapes the rest of the crate works with. They serialize with
//! camelCase field names, which is also what the CLI prints with `--json`.
//! Wire rows live in `crate::models::rows` and convert into these via `From`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =====================
// Scalar ID newtype wrappers
// =====================

macro_rules! string_id {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub String);

            impl $name {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    $name(value.to_string())
                }
            }
        )+
    };
}

string_id! {
    /// Owner aggregate; every non-reference row carries one.
    HouseId;
    LocationId;
    ManufacturerId;
    ServiceTypeId;
    RecurrenceId;
    PaintRecordId;
    HomeServiceId;
    PlantId;
    ReminderId;
}

// =====================
// Enums (lowercase strings on the wire)
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    Indoor,
    Outdoor,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SunRequirements {
    #[serde(rename = "no sun")]
    NoSun,
    #[serde(rename = "partial shade")]
    PartialShade,
    #[serde(rename = "full sun")]
    FullSun,
}

// =====================
// Houses and rooms
// =====================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

impl Address {
    pub fn is_blank(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.zip_code]
            .iter()
            .all(|s| s.trim().is_empty())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [&self.street, &self.city, &self.state, &self.zip_code]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        f.write_str(&parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: HouseId,
    pub name: String,
    pub owners: Vec<String>,
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub description: Option<String>,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =====================
// Reference tables
// =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintManufacturer {
    pub id: ManufacturerId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub id: ServiceTypeId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named repetition interval. `value` is one of daily/weekly/monthly/
/// quarterly/annual in practice but is carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub id: RecurrenceId,
    pub name: String,
    pub value: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =====================
// House-scoped records
// =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintRecord {
    pub id: PaintRecordId,
    pub manufacturer_id: ManufacturerId,
    pub manufacturer: Option<PaintManufacturer>,
    pub location_id: LocationId,
    pub location: Option<Location>,
    pub color: String,
    pub paint_type: String,
    pub finish_type: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeService {
    pub id: HomeServiceId,
    pub service_type_id: ServiceTypeId,
    pub service_type: Option<ServiceType>,
    pub provider: String,
    pub date: NaiveDate,
    pub status: ServiceStatus,
    pub recurrence_id: Option<RecurrenceId>,
    pub recurrence: Option<Recurrence>,
    pub notes: Option<String>,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HomeService {
    pub fn service_name(&self) -> &str {
        self.service_type
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("Unknown Service Type")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: PlantId,
    pub name: String,
    pub location_id: LocationId,
    pub location: Option<Location>,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    pub sun_requirements: SunRequirements,
    pub max_height: f64,
    pub max_width: f64,
    pub notes: Option<String>,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: ReminderId,
    pub title: String,
    pub details: String,
    pub due_date: NaiveDate,
    pub recurrence_id: Option<RecurrenceId>,
    pub recurrence: Option<Recurrence>,
    pub completed: bool,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `{value, label}` pair offered by a selection input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Rows that belong to exactly one house.
pub trait HouseOwned {
    fn house_id(&self) -> &HouseId;
}

macro_rules! house_owned {
    ($($ty:ty),+) => {
        $(
            impl HouseOwned for $ty {
                fn house_id(&self) -> &HouseId {
                    &self.house_id
                }
            }
        )+
    };
}

house_owned!(Location, PaintRecord, HomeService, Plant, Reminder);
