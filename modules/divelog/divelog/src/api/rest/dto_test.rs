use divelog_sdk::{DepthUnit, PressureUnit, TemperatureUnit, UnitPreferences};
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{DiveDto, DiveRequest, PatchPreferencesRequest, PlanRequest};
use crate::domain::error::DomainError;

fn imperial() -> UnitPreferences {
    UnitPreferences {
        depth: DepthUnit::Feet,
        temperature: TemperatureUnit::Fahrenheit,
        pressure: PressureUnit::Psi,
        ..UnitPreferences::default()
    }
}

fn dive_request(body: serde_json::Value) -> DiveRequest {
    serde_json::from_value(body).unwrap()
}

fn violated_fields(err: DomainError) -> Vec<String> {
    match err {
        DomainError::Validation(v) => v.into_iter().map(|v| v.field).collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn measurements_without_unit_use_the_callers_preference() {
    let req = dive_request(json!({
        "site_name": "Blue Hole",
        "dived_at": "2024-05-01T09:30:00Z",
        "bottom_time_min": 42,
        "max_depth": { "value": 100.0 },
        "water_temp": { "value": 78.0 },
        "start_pressure": { "value": 3000.0 }
    }));

    let draft = req.into_draft(&imperial()).unwrap();
    assert_eq!(draft.max_depth_cm, 3048);
    assert_eq!(draft.water_temp_cx10, Some(256));
    assert_eq!(draft.start_pressure_bar_x10, Some(2068));
    assert_eq!(draft.visibility_cm, None);
}

#[test]
fn explicit_units_override_the_preference() {
    let req = dive_request(json!({
        "site_name": "Blue Hole",
        "dived_at": "2024-05-01T09:30:00Z",
        "bottom_time_min": 42,
        "max_depth": { "value": 30.0, "unit": "m" },
        "weight": { "value": 6.5, "unit": "kg" }
    }));

    let draft = req.into_draft(&imperial()).unwrap();
    assert_eq!(draft.max_depth_cm, 3000);
    assert_eq!(draft.weight_g, Some(6500));
}

#[test]
fn wrong_or_unknown_units_are_reported_per_field() {
    let req = dive_request(json!({
        "site_name": "Blue Hole",
        "dived_at": "2024-05-01T09:30:00Z",
        "bottom_time_min": 42,
        "max_depth": { "value": 30.0, "unit": "bar" },
        "water_temp": { "value": 20.0, "unit": "kelvin" }
    }));

    let err = req.into_draft(&UnitPreferences::default()).unwrap_err();
    assert_eq!(violated_fields(err), ["max_depth", "water_temp"]);
}

#[test]
fn plan_depth_is_converted() {
    let req: PlanRequest = serde_json::from_value(json!({
        "site_name": "Wreck of the Thistlegorm",
        "planned_at": "2024-06-01T07:00:00+02:00",
        "planned_max_depth": { "value": 98.0, "unit": "ft" }
    }))
    .unwrap();

    let draft = req.into_draft(&UnitPreferences::default()).unwrap();
    assert_eq!(draft.planned_max_depth_cm, 2987);
}

#[test]
fn dive_output_carries_canonical_and_display_values() {
    let now = OffsetDateTime::now_utc();
    let dive = divelog_sdk::DiveLog {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        dive_number: Some(7),
        site_name: "Blue Hole".to_owned(),
        location: None,
        dived_at: now,
        bottom_time_min: 42,
        max_depth_cm: 3048,
        water_temp_cx10: None,
        visibility_cm: None,
        start_pressure_bar_x10: Some(2000),
        end_pressure_bar_x10: None,
        weight_g: None,
        notes: None,
        created_at: now,
        updated_at: now,
    };

    let json = serde_json::to_value(DiveDto::new(dive, &imperial())).unwrap();
    assert_eq!(json["max_depth_cm"], 3048);
    assert_eq!(json["display"]["max_depth"], json!({ "value": 100.0, "unit": "ft" }));
    assert_eq!(json["display"]["start_pressure"], json!({ "value": 2901.0, "unit": "psi" }));
    assert_eq!(json["display"]["water_temp"], json!({ "value": null, "unit": "f" }));
}

#[test]
fn preference_patch_rejects_unknown_units() {
    let req = PatchPreferencesRequest {
        depth: Some("fathoms".to_owned()),
        pressure: Some("BAR".to_owned()),
        ..PatchPreferencesRequest::default()
    };
    let err = req.into_patch().unwrap_err();
    assert_eq!(violated_fields(err), ["depth"]);

    let patch = PatchPreferencesRequest {
        pressure: Some("psi".to_owned()),
        ..PatchPreferencesRequest::default()
    }
    .into_patch()
    .unwrap();
    assert_eq!(patch.pressure, Some(PressureUnit::Psi));
    assert!(patch.depth.is_none());
}
