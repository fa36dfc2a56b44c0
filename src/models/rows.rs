//! Wire rows as the store returns them (snake_case, flat foreign keys,
//! optionally embedded related rows).
//!
//! Mapping into view models is total: every column lands in exactly one field
//! and an absent embedded row becomes `None`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::models::household::*;

#[derive(Debug, Clone, Deserialize)]
pub struct HouseRow {
    pub id: HouseId,
    pub name: String,
    #[serde(default)]
    pub owners: Option<Vec<String>>,
    #[serde(default)]
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HouseRow> for House {
    fn from(row: HouseRow) -> Self {
        House {
            id: row.id,
            name: row.name,
            owners: row.owners.unwrap_or_default(),
            address: row.address.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationRow {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            description: row.description,
            house_id: row.house_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManufacturerRow {
    pub id: ManufacturerId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ManufacturerRow> for PaintManufacturer {
    fn from(row: ManufacturerRow) -> Self {
        PaintManufacturer {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTypeRow {
    pub id: ServiceTypeId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceTypeRow> for ServiceType {
    fn from(row: ServiceTypeRow) -> Self {
        ServiceType {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceRow {
    pub id: RecurrenceId,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecurrenceRow> for Recurrence {
    fn from(row: RecurrenceRow) -> Self {
        Recurrence {
            id: row.id,
            name: row.name,
            value: row.value,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaintRecordRow {
    pub id: PaintRecordId,
    pub manufacturer_id: ManufacturerId,
    #[serde(default)]
    pub manufacturer: Option<ManufacturerRow>,
    pub location_id: LocationId,
    #[serde(default)]
    pub location: Option<LocationRow>,
    pub color_name: String,
    pub paint_type: String,
    pub finish_type: String,
    pub painted_at: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaintRecordRow> for PaintRecord {
    fn from(row: PaintRecordRow) -> Self {
        PaintRecord {
            id: row.id,
            manufacturer_id: row.manufacturer_id,
            manufacturer: row.manufacturer.map(Into::into),
            location_id: row.location_id,
            location: row.location.map(Into::into),
            color: row.color_name,
            paint_type: row.paint_type,
            finish_type: row.finish_type,
            date: row.painted_at,
            notes: row.notes,
            house_id: row.house_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomeServiceRow {
    pub id: HomeServiceId,
    pub service_type_id: ServiceTypeId,
    #[serde(default)]
    pub service_type: Option<ServiceTypeRow>,
    pub provider: String,
    pub date: NaiveDate,
    pub status: ServiceStatus,
    #[serde(default)]
    pub recurrence_id: Option<RecurrenceId>,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRow>,
    #[serde(default)]
    pub notes: Option<String>,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HomeServiceRow> for HomeService {
    fn from(row: HomeServiceRow) -> Self {
        HomeService {
            id: row.id,
            service_type_id: row.service_type_id,
            service_type: row.service_type.map(Into::into),
            provider: row.provider,
            date: row.date,
            status: row.status,
            recurrence_id: row.recurrence_id,
            recurrence: row.recurrence.map(Into::into),
            notes: row.notes,
            house_id: row.house_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlantRow {
    pub id: PlantId,
    pub name: String,
    pub location_id: LocationId,
    #[serde(default)]
    pub location: Option<LocationRow>,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    pub sun_requirements: SunRequirements,
    pub max_height: f64,
    pub max_width: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlantRow> for Plant {
    fn from(row: PlantRow) -> Self {
        Plant {
            id: row.id,
            name: row.name,
            location_id: row.location_id,
            location: row.location.map(Into::into),
            plant_type: row.plant_type,
            sun_requirements: row.sun_requirements,
            max_height: row.max_height,
            max_width: row.max_width,
            notes: row.notes,
            house_id: row.house_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderRow {
    pub id: ReminderId,
    pub title: String,
    pub details: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub recurrence_id: Option<RecurrenceId>,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRow>,
    pub completed: bool,
    pub house_id: HouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReminderRow> for Reminder {
    fn from(row: ReminderRow) -> Self {
        Reminder {
            id: row.id,
            title: row.title,
            details: row.details,
            due_date: row.due_date,
            recurrence_id: row.recurrence_id,
            recurrence: row.recurrence.map(Into::into),
            completed: row.completed,
            house_id: row.house_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
