//! Public models for the divelog module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the divelog module and its consumers. Measurements are always
//! canonical fixed-point integers; see [`crate::units`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;
use uuid::Uuid;

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub created_at: OffsetDateTime,
}

/// A logged dive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiveLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dive_number: Option<i32>,
    pub site_name: String,
    pub location: Option<String>,
    pub dived_at: OffsetDateTime,
    pub bottom_time_min: i32,
    pub max_depth_cm: i32,
    pub water_temp_cx10: Option<i32>,
    pub visibility_cm: Option<i32>,
    pub start_pressure_bar_x10: Option<i32>,
    pub end_pressure_bar_x10: Option<i32>,
    pub weight_g: Option<i32>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for creating or replacing a dive log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiveLogDraft {
    pub dive_number: Option<i32>,
    pub site_name: String,
    pub location: Option<String>,
    pub dived_at: OffsetDateTime,
    pub bottom_time_min: i32,
    pub max_depth_cm: i32,
    pub water_temp_cx10: Option<i32>,
    pub visibility_cm: Option<i32>,
    pub start_pressure_bar_x10: Option<i32>,
    pub end_pressure_bar_x10: Option<i32>,
    pub weight_g: Option<i32>,
    pub notes: Option<String>,
}

/// A planned future dive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivePlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub site_name: String,
    pub planned_at: OffsetDateTime,
    pub planned_max_depth_cm: i32,
    pub planned_bottom_time_min: Option<i32>,
    pub gas_mix: Option<String>,
    pub notes: Option<String>,
    pub safety_briefing: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for creating or replacing a dive plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivePlanDraft {
    pub site_name: String,
    pub planned_at: OffsetDateTime,
    pub planned_max_depth_cm: i32,
    pub planned_bottom_time_min: Option<i32>,
    pub gas_mix: Option<String>,
    pub notes: Option<String>,
    pub safety_briefing: Option<String>,
}

/// Certification track. Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CertificationCategory {
    Core,
    Specialty,
    Professional,
}

impl CertificationCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CertificationCategory::Core => "core",
            CertificationCategory::Specialty => "specialty",
            CertificationCategory::Professional => "professional",
        }
    }
}

impl FromStr for CertificationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Self::Core),
            "specialty" => Ok(Self::Specialty),
            "professional" => Ok(Self::Professional),
            other => Err(format!("unknown certification category '{other}'")),
        }
    }
}

impl fmt::Display for CertificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A certification an agency issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificationDefinition {
    pub id: Uuid,
    pub agency: String,
    pub name: String,
    pub category: CertificationCategory,
    pub level_rank: i32,
}

impl CertificationDefinition {
    /// Category, then level rank, then name.
    #[must_use]
    pub fn display_order(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.level_rank.cmp(&other.level_rank))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Sort definitions for display: core first, then by level rank, then by name.
pub fn sort_definitions(definitions: &mut [CertificationDefinition]) {
    definitions.sort_by(CertificationDefinition::display_order);
}

/// A certification held by a diver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub definition: CertificationDefinition,
    pub certified_on: Option<OffsetDateTime>,
    pub card_number: Option<String>,
    pub instructor: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Data for recording a certification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCertification {
    pub definition_id: Uuid,
    pub certified_on: Option<OffsetDateTime>,
    pub card_number: Option<String>,
    pub instructor: Option<String>,
}

/// Kind of a gear item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GearKind {
    Regulator,
    Bcd,
    Computer,
    ExposureSuit,
    Mask,
    Fins,
    Cylinder,
    Other,
}

impl GearKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GearKind::Regulator => "regulator",
            GearKind::Bcd => "bcd",
            GearKind::Computer => "computer",
            GearKind::ExposureSuit => "exposure_suit",
            GearKind::Mask => "mask",
            GearKind::Fins => "fins",
            GearKind::Cylinder => "cylinder",
            GearKind::Other => "other",
        }
    }
}

impl FromStr for GearKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regulator" => Ok(Self::Regulator),
            "bcd" => Ok(Self::Bcd),
            "computer" => Ok(Self::Computer),
            "exposure_suit" => Ok(Self::ExposureSuit),
            "mask" => Ok(Self::Mask),
            "fins" => Ok(Self::Fins),
            "cylinder" => Ok(Self::Cylinder),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown gear kind '{other}'")),
        }
    }
}

/// A piece of diving equipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GearItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: GearKind,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchased_on: Option<OffsetDateTime>,
    pub last_serviced_on: Option<OffsetDateTime>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for creating or replacing a gear item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GearItemDraft {
    pub name: String,
    pub kind: GearKind,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchased_on: Option<OffsetDateTime>,
    pub last_serviced_on: Option<OffsetDateTime>,
    pub notes: Option<String>,
}

/// A named set of gear items packed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GearKit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub item_ids: Vec<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Data for creating or replacing a gear kit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GearKitDraft {
    pub name: String,
    pub item_ids: Vec<Uuid>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn definition(name: &str, category: CertificationCategory, level_rank: i32) -> CertificationDefinition {
        CertificationDefinition {
            id: Uuid::new_v4(),
            agency: "PADI".to_owned(),
            name: name.to_owned(),
            category,
            level_rank,
        }
    }

    #[test]
    fn core_definitions_sort_first_by_rank_then_name() {
        let mut defs = vec![
            definition("Nitrox", CertificationCategory::Specialty, 1),
            definition("Open Water", CertificationCategory::Core, 2),
            definition("Advanced Open Water", CertificationCategory::Core, 2),
        ];
        sort_definitions(&mut defs);

        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Advanced Open Water", "Open Water", "Nitrox"]);
    }

    #[test]
    fn level_rank_wins_over_name() {
        let mut defs = vec![
            definition("Rescue Diver", CertificationCategory::Core, 3),
            definition("Open Water", CertificationCategory::Core, 1),
            definition("Divemaster", CertificationCategory::Professional, 1),
        ];
        sort_definitions(&mut defs);

        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Open Water", "Rescue Diver", "Divemaster"]);
    }

    #[test]
    fn category_and_gear_kind_parse_their_own_labels() {
        for c in [
            CertificationCategory::Core,
            CertificationCategory::Specialty,
            CertificationCategory::Professional,
        ] {
            assert_eq!(c.as_str().parse::<CertificationCategory>(), Ok(c));
        }
        assert_eq!("exposure_suit".parse::<GearKind>(), Ok(GearKind::ExposureSuit));
        assert!("snorkel".parse::<GearKind>().is_err());
    }
}
