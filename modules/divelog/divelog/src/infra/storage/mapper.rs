//! Row <-> model conversion at the storage boundary.

use anyhow::anyhow;
use divelog_sdk::{
    Certification, CertificationCategory, CertificationDefinition, DiveLog, DivePlan, GearItem,
    GearKind, GearKit, UnitPreferencesPatch, UserProfile,
};
use sea_orm::ActiveValue::Set;
use std::str::FromStr;
use uuid::Uuid;

use super::entity::{
    certification, certification_definition, dive_log, dive_plan, gear_item, gear_kit,
    unit_preferences, user,
};
use crate::domain::repo::UserCredentials;

impl From<user::Model> for UserProfile {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            display_name: m.display_name,
            created_at: m.created_at,
        }
    }
}

impl From<user::Model> for UserCredentials {
    fn from(m: user::Model) -> Self {
        Self {
            profile: UserProfile {
                id: m.id,
                email: m.email,
                display_name: m.display_name,
                created_at: m.created_at,
            },
            password_hash: m.password_hash,
            session_version: m.session_version,
        }
    }
}

/// Stored axes; an unrecognized value is treated as unset.
#[must_use]
pub fn preferences_patch(m: &unit_preferences::Model) -> UnitPreferencesPatch {
    UnitPreferencesPatch {
        depth: parse_axis("depth", m.depth.as_deref()),
        temperature: parse_axis("temperature", m.temperature.as_deref()),
        pressure: parse_axis("pressure", m.pressure.as_deref()),
        weight: parse_axis("weight", m.weight.as_deref()),
    }
}

fn parse_axis<T: FromStr>(axis: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        tracing::warn!(axis, value = raw, "Ignoring unknown stored unit");
    }
    parsed
}

impl From<dive_log::Model> for DiveLog {
    fn from(m: dive_log::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            dive_number: m.dive_number,
            site_name: m.site_name,
            location: m.location,
            dived_at: m.dived_at,
            bottom_time_min: m.bottom_time_min,
            max_depth_cm: m.max_depth_cm,
            water_temp_cx10: m.water_temp_cx10,
            visibility_cm: m.visibility_cm,
            start_pressure_bar_x10: m.start_pressure_bar_x10,
            end_pressure_bar_x10: m.end_pressure_bar_x10,
            weight_g: m.weight_g,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[must_use]
pub fn dive_active_model(d: &DiveLog) -> dive_log::ActiveModel {
    dive_log::ActiveModel {
        id: Set(d.id),
        user_id: Set(d.user_id),
        dive_number: Set(d.dive_number),
        site_name: Set(d.site_name.clone()),
        location: Set(d.location.clone()),
        dived_at: Set(d.dived_at),
        bottom_time_min: Set(d.bottom_time_min),
        max_depth_cm: Set(d.max_depth_cm),
        water_temp_cx10: Set(d.water_temp_cx10),
        visibility_cm: Set(d.visibility_cm),
        start_pressure_bar_x10: Set(d.start_pressure_bar_x10),
        end_pressure_bar_x10: Set(d.end_pressure_bar_x10),
        weight_g: Set(d.weight_g),
        notes: Set(d.notes.clone()),
        created_at: Set(d.created_at),
        updated_at: Set(d.updated_at),
    }
}

impl From<dive_plan::Model> for DivePlan {
    fn from(m: dive_plan::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            site_name: m.site_name,
            planned_at: m.planned_at,
            planned_max_depth_cm: m.planned_max_depth_cm,
            planned_bottom_time_min: m.planned_bottom_time_min,
            gas_mix: m.gas_mix,
            notes: m.notes,
            safety_briefing: m.safety_briefing,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[must_use]
pub fn plan_active_model(p: &DivePlan) -> dive_plan::ActiveModel {
    dive_plan::ActiveModel {
        id: Set(p.id),
        user_id: Set(p.user_id),
        site_name: Set(p.site_name.clone()),
        planned_at: Set(p.planned_at),
        planned_max_depth_cm: Set(p.planned_max_depth_cm),
        planned_bottom_time_min: Set(p.planned_bottom_time_min),
        gas_mix: Set(p.gas_mix.clone()),
        notes: Set(p.notes.clone()),
        safety_briefing: Set(p.safety_briefing.clone()),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    }
}

impl TryFrom<certification_definition::Model> for CertificationDefinition {
    type Error = anyhow::Error;

    fn try_from(m: certification_definition::Model) -> Result<Self, Self::Error> {
        let category = CertificationCategory::from_str(&m.category).map_err(|e| anyhow!(e))?;
        Ok(Self {
            id: m.id,
            agency: m.agency,
            name: m.name,
            category,
            level_rank: m.level_rank,
        })
    }
}

#[must_use]
pub fn certification(m: certification::Model, definition: CertificationDefinition) -> Certification {
    Certification {
        id: m.id,
        user_id: m.user_id,
        definition,
        certified_on: m.certified_on,
        card_number: m.card_number,
        instructor: m.instructor,
        created_at: m.created_at,
    }
}

#[must_use]
pub fn certification_active_model(c: &Certification) -> certification::ActiveModel {
    certification::ActiveModel {
        id: Set(c.id),
        user_id: Set(c.user_id),
        definition_id: Set(c.definition.id),
        certified_on: Set(c.certified_on),
        card_number: Set(c.card_number.clone()),
        instructor: Set(c.instructor.clone()),
        created_at: Set(c.created_at),
    }
}

impl TryFrom<gear_item::Model> for GearItem {
    type Error = anyhow::Error;

    fn try_from(m: gear_item::Model) -> Result<Self, Self::Error> {
        let kind = GearKind::from_str(&m.kind).map_err(|e| anyhow!(e))?;
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            kind,
            brand: m.brand,
            model: m.model,
            serial_number: m.serial_number,
            purchased_on: m.purchased_on,
            last_serviced_on: m.last_serviced_on,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

#[must_use]
pub fn gear_item_active_model(i: &GearItem) -> gear_item::ActiveModel {
    gear_item::ActiveModel {
        id: Set(i.id),
        user_id: Set(i.user_id),
        name: Set(i.name.clone()),
        kind: Set(i.kind.as_str().to_owned()),
        brand: Set(i.brand.clone()),
        model: Set(i.model.clone()),
        serial_number: Set(i.serial_number.clone()),
        purchased_on: Set(i.purchased_on),
        last_serviced_on: Set(i.last_serviced_on),
        notes: Set(i.notes.clone()),
        created_at: Set(i.created_at),
        updated_at: Set(i.updated_at),
    }
}

#[must_use]
pub fn gear_kit(m: gear_kit::Model, item_ids: Vec<Uuid>) -> GearKit {
    GearKit {
        id: m.id,
        user_id: m.user_id,
        name: m.name,
        item_ids,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}
