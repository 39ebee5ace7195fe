//! Wire types. Measurements come in as `{value, unit?}` in display units
//! and go out as canonical integers plus a `display` block rendered in the
//! caller's preferred units.

use std::str::FromStr;

use divelog_sdk::units::{DisplayMeasurement, to_canonical};
use divelog_sdk::{
    Certification, CertificationDefinition, ConversionError, DiveLog, DiveLogDraft, DivePlan,
    DivePlanDraft, DisplayUnit, GearItem, GearItemDraft, GearKind, GearKit, GearKitDraft,
    NewCertification, Quantity, UnitPreferences, UnitPreferencesPatch, UserProfile,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::fields::{DiveFields, GearFields, PlanFields, PreferenceFields, Violations};

// ---------- measurements ----------

/// A measurement in display units. Without `unit` the caller's preferred
/// unit for the quantity is assumed.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MeasurementInput {
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

impl MeasurementInput {
    fn resolve_unit(
        &self,
        quantity: Quantity,
        prefs: &UnitPreferences,
    ) -> Result<DisplayUnit, ConversionError> {
        match self.unit.as_deref() {
            Some(text) => text.parse::<DisplayUnit>()?.expect_quantity(quantity),
            None => Ok(prefs.unit_for(quantity)),
        }
    }
}

/// Canonical value of `input`, or a violation on `field`.
fn canonical(
    v: &mut Violations,
    field: &str,
    quantity: Quantity,
    input: Option<&MeasurementInput>,
    prefs: &UnitPreferences,
) -> Option<i32> {
    let input = input?;
    let converted = input
        .resolve_unit(quantity, prefs)
        .and_then(|unit| to_canonical(input.value, unit));
    match converted {
        Ok(value) => Some(value),
        Err(e) => {
            v.push(field, e.to_string());
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MeasurementDto {
    /// `null` when nothing was recorded.
    pub value: Option<f64>,
    pub unit: String,
}

impl From<DisplayMeasurement> for MeasurementDto {
    fn from(m: DisplayMeasurement) -> Self {
        Self {
            value: m.value,
            unit: m.unit.as_str().to_owned(),
        }
    }
}

// ---------- account ----------

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub display_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteAccountRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<UserProfile> for UserDto {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            display_name: p.display_name,
            created_at: p.created_at,
        }
    }
}

// ---------- preferences ----------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UnitPreferencesDto {
    /// `ft` or `m`
    pub depth: String,
    /// `f` or `c`
    pub temperature: String,
    /// `psi` or `bar`
    pub pressure: String,
    /// `lb` or `kg`
    pub weight: String,
}

impl From<UnitPreferences> for UnitPreferencesDto {
    fn from(p: UnitPreferences) -> Self {
        Self {
            depth: p.depth.as_str().to_owned(),
            temperature: p.temperature.as_str().to_owned(),
            pressure: p.pressure.as_str().to_owned(),
            weight: p.weight.as_str().to_owned(),
        }
    }
}

/// Only the axes present are changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatchPreferencesRequest {
    #[serde(default)]
    pub depth: Option<String>,
    #[serde(default)]
    pub temperature: Option<String>,
    #[serde(default)]
    pub pressure: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
}

fn parse_axis<T>(v: &mut Violations, field: &str, value: Option<&str>) -> Option<T>
where
    T: FromStr<Err = ConversionError>,
{
    match value?.parse() {
        Ok(unit) => Some(unit),
        Err(e) => {
            v.push(field, e.to_string());
            None
        }
    }
}

impl PatchPreferencesRequest {
    /// # Errors
    /// Returns a validation error naming every unrecognised unit.
    pub fn into_patch(self) -> Result<UnitPreferencesPatch, DomainError> {
        let mut v = Violations::new();
        let patch = UnitPreferencesPatch {
            depth: parse_axis(&mut v, PreferenceFields::DEPTH, self.depth.as_deref()),
            temperature: parse_axis(
                &mut v,
                PreferenceFields::TEMPERATURE,
                self.temperature.as_deref(),
            ),
            pressure: parse_axis(&mut v, PreferenceFields::PRESSURE, self.pressure.as_deref()),
            weight: parse_axis(&mut v, PreferenceFields::WEIGHT, self.weight.as_deref()),
        };
        v.finish()?;
        Ok(patch)
    }
}

// ---------- dives ----------

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DiveRequest {
    #[serde(default)]
    pub dive_number: Option<i32>,
    pub site_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub dived_at: OffsetDateTime,
    pub bottom_time_min: i32,
    pub max_depth: MeasurementInput,
    #[serde(default)]
    pub water_temp: Option<MeasurementInput>,
    #[serde(default)]
    pub visibility: Option<MeasurementInput>,
    #[serde(default)]
    pub start_pressure: Option<MeasurementInput>,
    #[serde(default)]
    pub end_pressure: Option<MeasurementInput>,
    #[serde(default)]
    pub weight: Option<MeasurementInput>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DiveRequest {
    /// Convert display measurements to canonical values.
    ///
    /// # Errors
    /// Returns a validation error for unknown units, units of the wrong
    /// quantity and values that cannot be stored.
    pub fn into_draft(self, prefs: &UnitPreferences) -> Result<DiveLogDraft, DomainError> {
        let mut v = Violations::new();
        let max_depth_cm = canonical(
            &mut v,
            DiveFields::MAX_DEPTH,
            Quantity::Depth,
            Some(&self.max_depth),
            prefs,
        );
        let water_temp_cx10 = canonical(
            &mut v,
            DiveFields::WATER_TEMP,
            Quantity::Temperature,
            self.water_temp.as_ref(),
            prefs,
        );
        let visibility_cm = canonical(
            &mut v,
            DiveFields::VISIBILITY,
            Quantity::Depth,
            self.visibility.as_ref(),
            prefs,
        );
        let start_pressure_bar_x10 = canonical(
            &mut v,
            DiveFields::START_PRESSURE,
            Quantity::Pressure,
            self.start_pressure.as_ref(),
            prefs,
        );
        let end_pressure_bar_x10 = canonical(
            &mut v,
            DiveFields::END_PRESSURE,
            Quantity::Pressure,
            self.end_pressure.as_ref(),
            prefs,
        );
        let weight_g = canonical(
            &mut v,
            DiveFields::WEIGHT,
            Quantity::Weight,
            self.weight.as_ref(),
            prefs,
        );
        v.finish()?;

        Ok(DiveLogDraft {
            dive_number: self.dive_number,
            site_name: self.site_name,
            location: self.location,
            dived_at: self.dived_at,
            bottom_time_min: self.bottom_time_min,
            max_depth_cm: max_depth_cm.unwrap_or_default(),
            water_temp_cx10,
            visibility_cm,
            start_pressure_bar_x10,
            end_pressure_bar_x10,
            weight_g,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DiveDisplayDto {
    pub max_depth: MeasurementDto,
    pub water_temp: MeasurementDto,
    pub visibility: MeasurementDto,
    pub start_pressure: MeasurementDto,
    pub end_pressure: MeasurementDto,
    pub weight: MeasurementDto,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiveDto {
    pub id: Uuid,
    pub dive_number: Option<i32>,
    pub site_name: String,
    pub location: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub dived_at: OffsetDateTime,
    pub bottom_time_min: i32,
    pub max_depth_cm: i32,
    pub water_temp_cx10: Option<i32>,
    pub visibility_cm: Option<i32>,
    pub start_pressure_bar_x10: Option<i32>,
    pub end_pressure_bar_x10: Option<i32>,
    pub weight_g: Option<i32>,
    pub notes: Option<String>,
    pub display: DiveDisplayDto,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl DiveDto {
    #[must_use]
    pub fn new(dive: DiveLog, prefs: &UnitPreferences) -> Self {
        let display = DiveDisplayDto {
            max_depth: prefs.display(Quantity::Depth, Some(dive.max_depth_cm)).into(),
            water_temp: prefs
                .display(Quantity::Temperature, dive.water_temp_cx10)
                .into(),
            visibility: prefs.display(Quantity::Depth, dive.visibility_cm).into(),
            start_pressure: prefs
                .display(Quantity::Pressure, dive.start_pressure_bar_x10)
                .into(),
            end_pressure: prefs
                .display(Quantity::Pressure, dive.end_pressure_bar_x10)
                .into(),
            weight: prefs.display(Quantity::Weight, dive.weight_g).into(),
        };
        Self {
            id: dive.id,
            dive_number: dive.dive_number,
            site_name: dive.site_name,
            location: dive.location,
            dived_at: dive.dived_at,
            bottom_time_min: dive.bottom_time_min,
            max_depth_cm: dive.max_depth_cm,
            water_temp_cx10: dive.water_temp_cx10,
            visibility_cm: dive.visibility_cm,
            start_pressure_bar_x10: dive.start_pressure_bar_x10,
            end_pressure_bar_x10: dive.end_pressure_bar_x10,
            weight_g: dive.weight_g,
            notes: dive.notes,
            display,
            created_at: dive.created_at,
            updated_at: dive.updated_at,
        }
    }
}

// ---------- plans ----------

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PlanRequest {
    pub site_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub planned_at: OffsetDateTime,
    pub planned_max_depth: MeasurementInput,
    #[serde(default)]
    pub planned_bottom_time_min: Option<i32>,
    #[serde(default)]
    pub gas_mix: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub safety_briefing: Option<String>,
}

impl PlanRequest {
    /// # Errors
    /// Returns a validation error when the planned depth cannot be converted.
    pub fn into_draft(self, prefs: &UnitPreferences) -> Result<DivePlanDraft, DomainError> {
        let mut v = Violations::new();
        let planned_max_depth_cm = canonical(
            &mut v,
            PlanFields::PLANNED_MAX_DEPTH,
            Quantity::Depth,
            Some(&self.planned_max_depth),
            prefs,
        );
        v.finish()?;

        Ok(DivePlanDraft {
            site_name: self.site_name,
            planned_at: self.planned_at,
            planned_max_depth_cm: planned_max_depth_cm.unwrap_or_default(),
            planned_bottom_time_min: self.planned_bottom_time_min,
            gas_mix: self.gas_mix,
            notes: self.notes,
            safety_briefing: self.safety_briefing,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlanDisplayDto {
    pub planned_max_depth: MeasurementDto,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanDto {
    pub id: Uuid,
    pub site_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub planned_at: OffsetDateTime,
    pub planned_max_depth_cm: i32,
    pub planned_bottom_time_min: Option<i32>,
    pub gas_mix: Option<String>,
    pub notes: Option<String>,
    pub safety_briefing: Option<String>,
    pub display: PlanDisplayDto,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl PlanDto {
    #[must_use]
    pub fn new(plan: DivePlan, prefs: &UnitPreferences) -> Self {
        Self {
            display: PlanDisplayDto {
                planned_max_depth: prefs
                    .display(Quantity::Depth, Some(plan.planned_max_depth_cm))
                    .into(),
            },
            id: plan.id,
            site_name: plan.site_name,
            planned_at: plan.planned_at,
            planned_max_depth_cm: plan.planned_max_depth_cm,
            planned_bottom_time_min: plan.planned_bottom_time_min,
            gas_mix: plan.gas_mix,
            notes: plan.notes,
            safety_briefing: plan.safety_briefing,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

// ---------- certifications ----------

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CertificationDefinitionDto {
    pub id: Uuid,
    pub agency: String,
    pub name: String,
    /// `core`, `specialty` or `professional`
    pub category: String,
    pub level_rank: i32,
}

impl From<CertificationDefinition> for CertificationDefinitionDto {
    fn from(d: CertificationDefinition) -> Self {
        Self {
            id: d.id,
            agency: d.agency,
            name: d.name,
            category: d.category.as_str().to_owned(),
            level_rank: d.level_rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CertificationDto {
    pub id: Uuid,
    pub definition: CertificationDefinitionDto,
    #[serde(with = "time::serde::rfc3339::option")]
    pub certified_on: Option<OffsetDateTime>,
    pub card_number: Option<String>,
    pub instructor: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Certification> for CertificationDto {
    fn from(c: Certification) -> Self {
        Self {
            id: c.id,
            definition: c.definition.into(),
            certified_on: c.certified_on,
            card_number: c.card_number,
            instructor: c.instructor,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCertificationRequest {
    pub definition_id: Uuid,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub certified_on: Option<OffsetDateTime>,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
}

impl From<NewCertificationRequest> for NewCertification {
    fn from(r: NewCertificationRequest) -> Self {
        Self {
            definition_id: r.definition_id,
            certified_on: r.certified_on,
            card_number: r.card_number,
            instructor: r.instructor,
        }
    }
}

// ---------- gear ----------

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GearItemRequest {
    pub name: String,
    /// `regulator`, `bcd`, `computer`, `exposure_suit`, `mask`, `fins`,
    /// `cylinder` or `other`
    pub kind: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub purchased_on: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_serviced_on: Option<OffsetDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl GearItemRequest {
    /// # Errors
    /// Returns a validation error for an unknown gear kind.
    pub fn into_draft(self) -> Result<GearItemDraft, DomainError> {
        let kind = GearKind::from_str(&self.kind)
            .map_err(|e| DomainError::validation(GearFields::KIND, e))?;
        Ok(GearItemDraft {
            name: self.name,
            kind,
            brand: self.brand,
            model: self.model,
            serial_number: self.serial_number,
            purchased_on: self.purchased_on,
            last_serviced_on: self.last_serviced_on,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GearItemDto {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub purchased_on: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_serviced_on: Option<OffsetDateTime>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<GearItem> for GearItemDto {
    fn from(g: GearItem) -> Self {
        Self {
            id: g.id,
            name: g.name,
            kind: g.kind.as_str().to_owned(),
            brand: g.brand,
            model: g.model,
            serial_number: g.serial_number,
            purchased_on: g.purchased_on,
            last_serviced_on: g.last_serviced_on,
            notes: g.notes,
            created_at: g.created_at,
            updated_at: g.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GearKitRequest {
    pub name: String,
    /// Owned gear item ids in kit order; repeats are dropped.
    #[serde(default)]
    pub item_ids: Vec<Uuid>,
}

impl From<GearKitRequest> for GearKitDraft {
    fn from(r: GearKitRequest) -> Self {
        Self {
            name: r.name,
            item_ids: r.item_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GearKitDto {
    pub id: Uuid,
    pub name: String,
    pub item_ids: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<GearKit> for GearKitDto {
    fn from(k: GearKit) -> Self {
        Self {
            id: k.id,
            name: k.name,
            item_ids: k.item_ids,
            created_at: k.created_at,
            updated_at: k.updated_at,
        }
    }
}
