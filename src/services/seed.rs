use chrono::{Duration, NaiveDate};
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::models::household::*;
use crate::models::requests::*;
use crate::session::HouseSession;

const HOUSE_NAME: &str = "Maple Cottage";
const ROOM_NAMES: [&str; 6] = ["Living Room", "Kitchen", "Primary Bedroom", "Home Office", "Bathroom", "Back Yard"];
const COLORS: [&str; 8] = [
    "Ocean Blue",
    "Chalk White",
    "Sage Green",
    "Warm Greige",
    "Charcoal",
    "Buttercream",
    "Terracotta",
    "Dove Grey",
];
const PAINT_TYPES: [&str; 3] = ["Latex", "Acrylic", "Oil"];
const FINISHES: [&str; 5] = ["Flat", "Matte", "Eggshell", "Satin", "Semi-Gloss"];
const PROVIDERS: [&str; 4] = ["Acme Home Services", "Brightside Co.", "Northwind Repair", "Riverside Pros"];
const PLANTS: [(&str, PlantType, SunRequirements); 6] = [
    ("Boston Fern", PlantType::Indoor, SunRequirements::PartialShade),
    ("Snake Plant", PlantType::Indoor, SunRequirements::NoSun),
    ("Fiddle Leaf Fig", PlantType::Indoor, SunRequirements::PartialShade),
    ("Tomato", PlantType::Outdoor, SunRequirements::FullSun),
    ("Lavender", PlantType::Outdoor, SunRequirements::FullSun),
    ("Hosta", PlantType::Outdoor, SunRequirements::PartialShade),
];
const REMINDERS: [(&str, &str); 5] = [
    ("Replace HVAC filter", "Use the 16x25x1 filters in the garage."),
    ("Clean gutters", "Front and back, check the downspouts."),
    ("Test smoke detectors", "Every floor, replace batteries if needed."),
    ("Flush water heater", "Drain a few gallons to clear sediment."),
    ("Seal deck", "Check the forecast for two dry days first."),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub rooms: usize,
    pub paint_records: usize,
    pub home_services: usize,
    pub plants: usize,
    pub reminders: usize,
}

fn pick<'a, T>(rng: &mut SmallRng, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// Create a demo house with rooms and a plausible history around `today`.
/// The generator is seeded, so every run produces the same records.
pub fn run(session: &mut HouseSession<'_>, today: NaiveDate) -> Result<SeedSummary, String> {
    let manufacturers = session.manufacturers().map_err(|e| format!("load manufacturers failed: {}", e))?;
    let service_types = session.service_types().map_err(|e| format!("load service types failed: {}", e))?;
    let recurrences = session.recurrences().map_err(|e| format!("load recurrences failed: {}", e))?;
    if manufacturers.is_empty() || service_types.is_empty() {
        return Err("reference tables are empty; run `household migrate` first".to_string());
    }

    let house = session
        .create_house(&NewHouse {
            name: HOUSE_NAME.to_string(),
            owners: vec!["Alex Example".to_string()],
            address: Address {
                street: "12 Orchard Lane".to_string(),
                city: "Springfield".to_string(),
                state: "OR".to_string(),
                zip_code: "97477".to_string(),
            },
            rooms: ROOM_NAMES.iter().map(|r| r.to_string()).collect(),
        })
        .map_err(|e| format!("create house failed: {}", e))?;
    session.select(&house.id).map_err(|e| e.to_string())?;
    let rooms = session.locations().map_err(|e| format!("load rooms failed: {}", e))?;
    if rooms.is_empty() {
        return Err(format!("house {} has no rooms after creation", house.id));
    }

    let mut rng = SmallRng::seed_from_u64(0x4845_4C4C_4F48_4F4Du64);
    let mut summary = SeedSummary {
        rooms: rooms.len(),
        ..SeedSummary::default()
    };
    info!("Seed: created {} ({}) with {} room(s)", house.name, house.id, rooms.len());

    for room in rooms.iter().filter(|r| r.name != "Back Yard") {
        let record = NewPaintRecord {
            manufacturer_id: pick(&mut rng, &manufacturers).id.clone(),
            location_id: room.id.clone(),
            color: pick(&mut rng, &COLORS).to_string(),
            paint_type: pick(&mut rng, &PAINT_TYPES).to_string(),
            finish_type: pick(&mut rng, &FINISHES).to_string(),
            date: today - Duration::days(rng.random_range(30..1500)),
            notes: rng.random_bool(0.3).then(|| "Two coats.".to_string()),
            house_id: house.id.clone(),
        };
        session
            .create_paint_record(record)
            .map_err(|e| format!("create paint record failed: {}", e))?;
        summary.paint_records += 1;
    }

    for service_type in &service_types {
        for _ in 0..rng.random_range(1..=2) {
            let offset = rng.random_range(-400..120);
            let date = today + Duration::days(offset);
            let status = if offset >= 0 {
                ServiceStatus::Scheduled
            } else if rng.random_bool(0.1) {
                ServiceStatus::Cancelled
            } else {
                ServiceStatus::Completed
            };
            let recurrence_id = if !recurrences.is_empty() && rng.random_bool(0.5) {
                Some(pick(&mut rng, &recurrences).id.clone())
            } else {
                None
            };
            let service = NewHomeService {
                service_type_id: service_type.id.clone(),
                provider: pick(&mut rng, &PROVIDERS).to_string(),
                date,
                status,
                recurrence_id,
                notes: None,
                house_id: house.id.clone(),
            };
            session
                .create_home_service(service)
                .map_err(|e| format!("create service failed: {}", e))?;
            summary.home_services += 1;
        }
    }

    let outdoor = rooms.iter().find(|r| r.name == "Back Yard").unwrap_or(&rooms[0]);
    for (name, plant_type, sun) in PLANTS {
        let location = match plant_type {
            PlantType::Outdoor => outdoor,
            PlantType::Indoor => pick(&mut rng, &rooms),
        };
        let plant = NewPlant {
            name: name.to_string(),
            location_id: location.id.clone(),
            plant_type,
            sun_requirements: sun,
            max_height: rng.random_range(6..72) as f64,
            max_width: rng.random_range(6..48) as f64,
            notes: None,
            house_id: house.id.clone(),
        };
        session.create_plant(plant).map_err(|e| format!("create plant failed: {}", e))?;
        summary.plants += 1;
    }

    for (title, details) in REMINDERS {
        let due = today + Duration::days(rng.random_range(-10..90));
        let reminder = NewReminder {
            title: title.to_string(),
            details: details.to_string(),
            due_date: due,
            recurrence_id: recurrences.first().map(|r| r.id.clone()),
            completed: due < today && rng.random_bool(0.5),
            house_id: house.id.clone(),
        };
        session
            .create_reminder(reminder)
            .map_err(|e| format!("create reminder failed: {}", e))?;
        summary.reminders += 1;
    }

    info!(
        "Seed: complete (paint={}, services={}, plants={}, reminders={})",
        summary.paint_records, summary.home_services, summary.plants, summary.reminders
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn seeds_a_selected_demo_house() {
        let store = MemoryStore::with_reference_data();
        let mut session = HouseSession::new(&store);

        let summary = run(&mut session, today()).unwrap();

        assert_eq!(summary.rooms, ROOM_NAMES.len());
        assert_eq!(summary.paint_records, ROOM_NAMES.len() - 1);
        assert_eq!(summary.plants, PLANTS.len());
        assert_eq!(summary.reminders, REMINDERS.len());
        assert!(summary.home_services >= 1);

        assert_eq!(session.current().map(|h| h.name.as_str()), Some(HOUSE_NAME));
        assert_eq!(session.paint_records().unwrap().len(), summary.paint_records);
        assert_eq!(session.home_services().unwrap().len(), summary.home_services);
        let tomato = session.plants().unwrap().into_iter().find(|p| p.name == "Tomato").unwrap();
        assert_eq!(tomato.location.map(|l| l.name), Some("Back Yard".to_string()));
    }

    #[test]
    fn runs_are_deterministic() {
        let colors = |store: &MemoryStore| {
            let mut session = HouseSession::new(store);
            run(&mut session, today()).unwrap();
            session
                .paint_records()
                .unwrap()
                .into_iter()
                .map(|p| (p.color, p.date))
                .collect::<Vec<_>>()
        };
        let first = colors(&MemoryStore::with_reference_data());
        let second = colors(&MemoryStore::with_reference_data());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_reference_tables_are_reported() {
        let store = MemoryStore::new();
        let mut session = HouseSession::new(&store);
        let err = run(&mut session, today()).unwrap_err();
        assert!(err.contains("migrate"));
    }
}
