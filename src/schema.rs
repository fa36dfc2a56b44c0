//! Table, column and relation names of the store schema
//! (see `migrations/` for the DDL).

use crate::store::Embed;

pub mod tables {
    pub const HOUSES: &str = "houses";
    pub const LOCATIONS: &str = "locations";
    pub const PAINT_MANUFACTURERS: &str = "paint_manufacturers";
    pub const SERVICE_TYPES: &str = "service_types";
    pub const RECURRENCES: &str = "recurrences";
    pub const PAINT_RECORDS: &str = "paint_records";
    pub const HOME_SERVICES: &str = "home_services";
    pub const PLANTS: &str = "plants";
    pub const REMINDERS: &str = "reminders";
}

pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const HOUSE_ID: &str = "house_id";
    pub const PAINTED_AT: &str = "painted_at";
    pub const DATE: &str = "date";
    pub const DUE_DATE: &str = "due_date";
    pub const TYPE: &str = "type";
    pub const SUN_REQUIREMENTS: &str = "sun_requirements";
}

pub mod embeds {
    use super::{Embed, tables};

    pub const MANUFACTURER: Embed = Embed {
        alias: "manufacturer",
        table: tables::PAINT_MANUFACTURERS,
        column: "manufacturer_id",
    };
    pub const LOCATION: Embed = Embed {
        alias: "location",
        table: tables::LOCATIONS,
        column: "location_id",
    };
    pub const SERVICE_TYPE: Embed = Embed {
        alias: "service_type",
        table: tables::SERVICE_TYPES,
        column: "service_type_id",
    };
    pub const RECURRENCE: Embed = Embed {
        alias: "recurrence",
        table: tables::RECURRENCES,
        column: "recurrence_id",
    };
}
