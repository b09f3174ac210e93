use serde::{Deserialize, Deserializer, Serialize};

#[cfg(test)]
mod tests;

/// Entity is the last known state of one upstream sensor or device, as
/// returned by the status API (`GET /api/states`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier (e.g., "sensor.kitchen_temperature")
    #[serde(rename = "entity_id")]
    pub id: String,

    /// Raw state value; may be non-numeric ("unknown", "unavailable")
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: EntityAttributes,

    /// Informational only, never used for expiry
    /// (e.g., "2023-12-27T15:28:26.287133+00:00")
    #[serde(default)]
    pub last_changed: Option<String>,

    #[serde(default)]
    pub last_updated: Option<String>,

    #[serde(default)]
    pub context: Option<EntityContext>,
}

/// Subset of entity attributes the service cares about. Unknown attributes
/// are ignored during decoding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityAttributes {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub device_class: Option<String>,
    #[serde(default)]
    pub unit_of_measurement: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Upstream change context
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityContext {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Entity {
    /// Device class, or "" when the attribute is absent
    pub fn device_class(&self) -> &str {
        self.attributes.device_class.as_deref().unwrap_or("")
    }

    /// Human label, or "" when the attribute is absent
    pub fn friendly_name(&self) -> &str {
        self.attributes.friendly_name.as_deref().unwrap_or("")
    }
}

/// Decode JSON `null` as the type's default so one sparse entity does not
/// fail the whole payload
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
