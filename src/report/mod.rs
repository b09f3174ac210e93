use crate::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};


/// Device class of entities that make it into the report
pub const DEVICE_CLASS_TEMPERATURE: &str = "temperature";

/// Room temperature report served to display clients
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomReport {
    /// Report generation time (unix seconds)
    #[serde(rename = "lastUpdatedSec")]
    pub last_updated: i64,

    /// Rooms sorted by name
    pub rooms: Vec<Room>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    #[serde(rename = "temp")]
    pub temperature: f32,
}

/// Build a room report from cached entities.
///
/// Non-temperature entities and states that do not parse as a finite `f32`
/// are skipped. Rooms are stably sorted by name so equal names keep their
/// input order.
pub fn build_report(entities: &[Entity], now: DateTime<Utc>) -> RoomReport {
    let mut rooms: Vec<Room> = entities.iter().filter_map(to_room).collect();

    rooms.sort_by(|a, b| a.name.cmp(&b.name));

    RoomReport {
        last_updated: now.timestamp(),
        rooms,
    }
}

fn to_room(entity: &Entity) -> Option<Room> {
    if !entity
        .device_class()
        .eq_ignore_ascii_case(DEVICE_CLASS_TEMPERATURE)
    {
        return None;
    }

    let temperature = entity.state.parse::<f32>().ok().filter(|t| t.is_finite())?;

    Some(Room {
        name: room_name(entity.friendly_name()).to_string(),
        temperature,
    })
}

/// Strip one trailing " Temperature" or " temperature" from a friendly name
pub fn room_name(friendly_name: &str) -> &str {
    friendly_name
        .strip_suffix(" Temperature")
        .or_else(|| friendly_name.strip_suffix(" temperature"))
        .unwrap_or(friendly_name)
}
