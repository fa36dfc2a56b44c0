//! Create/update payloads, validated before anything is sent to the store.
//!
//! `New*` types carry every field an insert needs; `*Changes` types carry only
//! the fields a partial update touches. Both deserialize from camelCase JSON
//! (the CLI accepts them verbatim) and render to snake_case column maps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

use crate::models::household::*;
use crate::utils::double_option;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// One or more field-level failures, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self.errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Default)]
struct Checks(Vec<FieldError>);

impl Checks {
    fn fail(&mut self, field: &'static str, message: &str) {
        self.0.push(FieldError {
            field,
            message: message.to_string(),
        });
    }

    fn required(&mut self, field: &'static str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, message);
        }
        self
    }

    fn required_if_set(&mut self, field: &'static str, value: Option<&str>, message: &str) -> &mut Self {
        if let Some(v) = value {
            self.required(field, v, message);
        }
        self
    }

    fn at_least_zero(&mut self, field: &'static str, value: f64, message: &str) -> &mut Self {
        if !value.is_finite() || value < 0.0 {
            self.fail(field, message);
        }
        self
    }

    fn finish(&mut self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: std::mem::take(&mut self.0),
            })
        }
    }
}

/// Column map for a partial update; `None` fields are left out entirely.
#[derive(Default)]
struct Patch(Map<String, Value>);

impl Patch {
    fn set<T: Serialize>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.0.insert(column.to_string(), json!(v));
        }
        self
    }

    fn finish(&mut self) -> Result<Value, ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError {
                errors: vec![FieldError {
                    field: "changes",
                    message: "No changes to apply".to_string(),
                }],
            });
        }
        Ok(Value::Object(std::mem::take(&mut self.0)))
    }
}

fn trimmed_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn address_value(address: &Address) -> Value {
    if address.is_blank() { Value::Null } else { json!(address) }
}

fn scheduled() -> ServiceStatus {
    ServiceStatus::Scheduled
}

// =====================
// Houses and rooms
// =====================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHouse {
    pub name: String,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub address: Address,
    /// Rooms created alongside the house.
    #[serde(default)]
    pub rooms: Vec<String>,
}

impl NewHouse {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = Checks::default();
        checks.required("name", &self.name, "House name is required");
        if self.rooms.iter().any(|r| r.trim().is_empty()) {
            checks.fail("rooms", "Room names cannot be blank");
        }
        checks.finish()
    }

    pub fn to_row(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "owners": trimmed_list(&self.owners),
            "address": address_value(&self.address),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseChanges {
    pub name: Option<String>,
    pub owners: Option<Vec<String>>,
    pub address: Option<Address>,
}

impl HouseChanges {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required_if_set("name", self.name.as_deref(), "House name is required")
            .finish()
    }

    pub fn to_changes(&self) -> Result<Value, ValidationError> {
        Patch::default()
            .set("name", self.name.as_deref().map(str::trim))
            .set("owners", self.owners.as_deref().map(trimmed_list))
            .set("address", self.address.as_ref().map(address_value))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub house_id: HouseId,
}

impl NewLocation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("name", &self.name, "Room name is required")
            .required("houseId", self.house_id.as_str(), "House is required")
            .finish()
    }

    pub fn to_row(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "description": self.description,
            "house_id": self.house_id,
        })
    }
}

// =====================
// Paint records
// =====================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaintRecord {
    pub manufacturer_id: ManufacturerId,
    pub location_id: LocationId,
    pub color: String,
    pub paint_type: String,
    pub finish_type: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub house_id: HouseId,
}

impl NewPaintRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("paintType", &self.paint_type, "Paint type is required")
            .required("locationId", self.location_id.as_str(), "Location is required")
            .required("manufacturerId", self.manufacturer_id.as_str(), "Manufacturer is required")
            .required("finishType", &self.finish_type, "Finish is required")
            .required("color", &self.color, "Color is required")
            .required("houseId", self.house_id.as_str(), "House is required")
            .finish()
    }

    pub fn to_row(&self) -> Value {
        json!({
            "manufacturer_id": self.manufacturer_id,
            "location_id": self.location_id,
            "color_name": self.color.trim(),
            "paint_type": self.paint_type.trim(),
            "finish_type": self.finish_type.trim(),
            "painted_at": self.date,
            "notes": self.notes,
            "house_id": self.house_id,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintRecordChanges {
    pub manufacturer_id: Option<ManufacturerId>,
    pub location_id: Option<LocationId>,
    pub color: Option<String>,
    pub paint_type: Option<String>,
    pub finish_type: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl PaintRecordChanges {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required_if_set("paintType", self.paint_type.as_deref(), "Paint type is required")
            .required_if_set("locationId", self.location_id.as_ref().map(|l| l.as_str()), "Location is required")
            .required_if_set(
                "manufacturerId",
                self.manufacturer_id.as_ref().map(|m| m.as_str()),
                "Manufacturer is required",
            )
            .required_if_set("finishType", self.finish_type.as_deref(), "Finish is required")
            .required_if_set("color", self.color.as_deref(), "Color is required")
            .finish()
    }

    pub fn to_changes(&self) -> Result<Value, ValidationError> {
        Patch::default()
            .set("manufacturer_id", self.manufacturer_id.as_ref())
            .set("location_id", self.location_id.as_ref())
            .set("color_name", self.color.as_deref().map(str::trim))
            .set("paint_type", self.paint_type.as_deref().map(str::trim))
            .set("finish_type", self.finish_type.as_deref().map(str::trim))
            .set("painted_at", self.date)
            .set("notes", self.notes.as_ref())
            .finish()
    }
}

// =====================
// Home services
// =====================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHomeService {
    pub service_type_id: ServiceTypeId,
    pub provider: String,
    pub date: NaiveDate,
    #[serde(default = "scheduled")]
    pub status: ServiceStatus,
    #[serde(default)]
    pub recurrence_id: Option<RecurrenceId>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub house_id: HouseId,
}

impl NewHomeService {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("serviceTypeId", self.service_type_id.as_str(), "Service type is required")
            .required("provider", &self.provider, "Provider is required")
            .required("houseId", self.house_id.as_str(), "House is required")
            .finish()
    }

    pub fn to_row(&self) -> Value {
        json!({
            "service_type_id": self.service_type_id,
            "provider": self.provider.trim(),
            "date": self.date,
            "status": self.status,
            "recurrence_id": self.recurrence_id,
            "notes": self.notes,
            "house_id": self.house_id,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeServiceChanges {
    pub service_type_id: Option<ServiceTypeId>,
    pub provider: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<ServiceStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub recurrence_id: Option<Option<RecurrenceId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl HomeServiceChanges {
    /// The "complete" and "cancel" actions are plain status edits.
    pub fn status(status: ServiceStatus) -> Self {
        HomeServiceChanges {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required_if_set(
                "serviceTypeId",
                self.service_type_id.as_ref().map(|s| s.as_str()),
                "Service type is required",
            )
            .required_if_set("provider", self.provider.as_deref(), "Provider is required")
            .finish()
    }

    pub fn to_changes(&self) -> Result<Value, ValidationError> {
        Patch::default()
            .set("service_type_id", self.service_type_id.as_ref())
            .set("provider", self.provider.as_deref().map(str::trim))
            .set("date", self.date)
            .set("status", self.status)
            .set("recurrence_id", self.recurrence_id.as_ref())
            .set("notes", self.notes.as_ref())
            .finish()
    }
}

// =====================
// Plants
// =====================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlant {
    pub name: String,
    pub location_id: LocationId,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    pub sun_requirements: SunRequirements,
    pub max_height: f64,
    pub max_width: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub house_id: HouseId,
}

impl NewPlant {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("name", &self.name, "Name is required")
            .required("locationId", self.location_id.as_str(), "Location is required")
            .at_least_zero("maxHeight", self.max_height, "Maximum height must be at least 0")
            .at_least_zero("maxWidth", self.max_width, "Maximum width must be at least 0")
            .required("houseId", self.house_id.as_str(), "House is required")
            .finish()
    }

    pub fn to_row(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "location_id": self.location_id,
            "type": self.plant_type,
            "sun_requirements": self.sun_requirements,
            "max_height": self.max_height,
            "max_width": self.max_width,
            "notes": self.notes,
            "house_id": self.house_id,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantChanges {
    pub name: Option<String>,
    pub location_id: Option<LocationId>,
    #[serde(rename = "type")]
    pub plant_type: Option<PlantType>,
    pub sun_requirements: Option<SunRequirements>,
    pub max_height: Option<f64>,
    pub max_width: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl PlantChanges {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = Checks::default();
        checks
            .required_if_set("name", self.name.as_deref(), "Name is required")
            .required_if_set("locationId", self.location_id.as_ref().map(|l| l.as_str()), "Location is required");
        if let Some(h) = self.max_height {
            checks.at_least_zero("maxHeight", h, "Maximum height must be at least 0");
        }
        if let Some(w) = self.max_width {
            checks.at_least_zero("maxWidth", w, "Maximum width must be at least 0");
        }
        checks.finish()
    }

    pub fn to_changes(&self) -> Result<Value, ValidationError> {
        Patch::default()
            .set("name", self.name.as_deref().map(str::trim))
            .set("location_id", self.location_id.as_ref())
            .set("type", self.plant_type)
            .set("sun_requirements", self.sun_requirements)
            .set("max_height", self.max_height)
            .set("max_width", self.max_width)
            .set("notes", self.notes.as_ref())
            .finish()
    }
}

// =====================
// Reminders
// =====================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub title: String,
    pub details: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub recurrence_id: Option<RecurrenceId>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub house_id: HouseId,
}

impl NewReminder {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("title", &self.title, "Title is required")
            .required("details", &self.details, "Details are required")
            .required("houseId", self.house_id.as_str(), "House is required")
            .finish()
    }

    pub fn to_row(&self) -> Value {
        json!({
            "title": self.title.trim(),
            "details": self.details.trim(),
            "due_date": self.due_date,
            "recurrence_id": self.recurrence_id,
            "completed": self.completed,
            "house_id": self.house_id,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderChanges {
    pub title: Option<String>,
    pub details: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub recurrence_id: Option<Option<RecurrenceId>>,
    pub completed: Option<bool>,
}

impl ReminderChanges {
    pub fn completed() -> Self {
        ReminderChanges {
            completed: Some(true),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required_if_set("title", self.title.as_deref(), "Title is required")
            .required_if_set("details", self.details.as_deref(), "Details are required")
            .finish()
    }

    pub fn to_changes(&self) -> Result<Value, ValidationError> {
        Patch::default()
            .set("title", self.title.as_deref().map(str::trim))
            .set("details", self.details.as_deref().map(str::trim))
            .set("due_date", self.due_date)
            .set("recurrence_id", self.recurrence_id.as_ref())
            .set("completed", self.completed)
            .finish()
    }
}
