use super::*;

#[test]
fn test_decode_states_payload() {
    let body = r#"[
        {
            "entity_id": "sensor.kitchen_temperature",
            "state": "21.5",
            "attributes": {
                "state_class": "measurement",
                "unit_of_measurement": "°C",
                "device_class": "temperature",
                "friendly_name": "Kitchen Temperature"
            },
            "last_changed": "2023-12-27T15:28:26.287133+00:00",
            "last_updated": "2023-12-27T15:28:26.287133+00:00",
            "context": {
                "id": "01HJR6Z2YQ",
                "parent_id": null,
                "user_id": null
            }
        }
    ]"#;

    let entities: Vec<Entity> = serde_json::from_str(body).unwrap();
    assert_eq!(entities.len(), 1);

    let entity = &entities[0];
    assert_eq!(entity.id, "sensor.kitchen_temperature");
    assert_eq!(entity.state, "21.5");
    assert_eq!(entity.device_class(), "temperature");
    assert_eq!(entity.friendly_name(), "Kitchen Temperature");
    assert_eq!(entity.attributes.unit_of_measurement.as_deref(), Some("°C"));
    assert_eq!(
        entity.last_updated.as_deref(),
        Some("2023-12-27T15:28:26.287133+00:00")
    );
    assert_eq!(
        entity.context.as_ref().and_then(|c| c.id.as_deref()),
        Some("01HJR6Z2YQ")
    );
}

#[test]
fn test_decode_missing_and_null_attributes() {
    let body = r#"[
        {"entity_id": "sun.sun", "state": "above_horizon"},
        {"entity_id": "sensor.x", "state": "1", "attributes": {"device_class": null}}
    ]"#;

    let entities: Vec<Entity> = serde_json::from_str(body).unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].device_class(), "");
    assert_eq!(entities[0].friendly_name(), "");
    assert_eq!(entities[1].device_class(), "");
}

#[test]
fn test_decode_null_state_and_attributes() {
    let body = r#"[
        {"entity_id": "sensor.a", "state": null, "attributes": {"device_class": "temperature"}},
        {"entity_id": "sensor.b", "state": "18.0", "attributes": null},
        {"entity_id": "sensor.k", "state": "21.5", "attributes": {"friendly_name": "Kitchen"}}
    ]"#;

    let entities: Vec<Entity> = serde_json::from_str(body).unwrap();
    assert_eq!(entities.len(), 3);

    assert_eq!(entities[0].state, "");
    assert_eq!(entities[0].device_class(), "temperature");

    assert_eq!(entities[1].state, "18.0");
    assert_eq!(entities[1].attributes, EntityAttributes::default());

    assert_eq!(entities[2].state, "21.5");
    assert_eq!(entities[2].friendly_name(), "Kitchen");
}

#[test]
fn test_decode_rejects_missing_entity_id() {
    let body = r#"[{"state": "on"}]"#;
    assert!(serde_json::from_str::<Vec<Entity>>(body).is_err());
}
