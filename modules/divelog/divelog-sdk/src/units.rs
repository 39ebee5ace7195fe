//! Canonical measurements and display-unit conversion.
//!
//! Every measurement is persisted as a fixed-point integer in a metric unit:
//!
//! | Quantity    | Canonical unit         | Scale |
//! |-------------|------------------------|-------|
//! | depth       | centimeters            | 100   |
//! | temperature | tenths of a degree C   | 10    |
//! | pressure    | tenths of a bar        | 10    |
//! | weight      | grams                  | 1000  |
//!
//! Display values are derived on the way out and never stored.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const CM_PER_METER: f64 = 100.0;
pub const FEET_PER_METER: f64 = 3.28084;
pub const TEMPERATURE_SCALE: f64 = 10.0;
pub const PRESSURE_SCALE: f64 = 10.0;
pub const PSI_PER_BAR: f64 = 14.5038;
pub const GRAMS_PER_KG: f64 = 1000.0;
pub const POUNDS_PER_KG: f64 = 2.20462;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("display value must be a finite number")]
    NonFinite,

    #[error("value {value} {unit} is out of range")]
    OutOfRange { value: String, unit: &'static str },

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("unit '{unit}' cannot express {expected}")]
    WrongQuantity {
        unit: &'static str,
        expected: &'static str,
    },
}

/// Physical quantity a display unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Depth,
    Temperature,
    Pressure,
    Weight,
}

impl Quantity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Quantity::Depth => "depth",
            Quantity::Temperature => "temperature",
            Quantity::Pressure => "pressure",
            Quantity::Weight => "weight",
        }
    }
}

macro_rules! unit_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ConversionError::UnknownUnit(s.to_owned())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

unit_enum!(
    /// Depth and visibility display unit.
    DepthUnit { Feet => "ft", Meters => "m" }
);
unit_enum!(
    /// Water temperature display unit.
    TemperatureUnit { Fahrenheit => "f", Celsius => "c" }
);
unit_enum!(
    /// Cylinder pressure display unit.
    PressureUnit { Psi => "psi", Bar => "bar" }
);
unit_enum!(
    /// Weight display unit.
    WeightUnit { Pound => "lb", Kilogram => "kg" }
);
unit_enum!(
    /// Any display unit, regardless of quantity.
    DisplayUnit {
        Feet => "ft",
        Meters => "m",
        Fahrenheit => "f",
        Celsius => "c",
        Psi => "psi",
        Bar => "bar",
        Pound => "lb",
        Kilogram => "kg",
    }
);

impl From<DepthUnit> for DisplayUnit {
    fn from(unit: DepthUnit) -> Self {
        match unit {
            DepthUnit::Feet => DisplayUnit::Feet,
            DepthUnit::Meters => DisplayUnit::Meters,
        }
    }
}

impl From<TemperatureUnit> for DisplayUnit {
    fn from(unit: TemperatureUnit) -> Self {
        match unit {
            TemperatureUnit::Fahrenheit => DisplayUnit::Fahrenheit,
            TemperatureUnit::Celsius => DisplayUnit::Celsius,
        }
    }
}

impl From<PressureUnit> for DisplayUnit {
    fn from(unit: PressureUnit) -> Self {
        match unit {
            PressureUnit::Psi => DisplayUnit::Psi,
            PressureUnit::Bar => DisplayUnit::Bar,
        }
    }
}

impl From<WeightUnit> for DisplayUnit {
    fn from(unit: WeightUnit) -> Self {
        match unit {
            WeightUnit::Pound => DisplayUnit::Pound,
            WeightUnit::Kilogram => DisplayUnit::Kilogram,
        }
    }
}

impl DisplayUnit {
    #[must_use]
    pub fn quantity(self) -> Quantity {
        match self {
            DisplayUnit::Feet | DisplayUnit::Meters => Quantity::Depth,
            DisplayUnit::Fahrenheit | DisplayUnit::Celsius => Quantity::Temperature,
            DisplayUnit::Psi | DisplayUnit::Bar => Quantity::Pressure,
            DisplayUnit::Pound | DisplayUnit::Kilogram => Quantity::Weight,
        }
    }

    /// Number of decimals shown for this unit.
    #[must_use]
    pub fn precision(self) -> i32 {
        match self {
            DisplayUnit::Feet
            | DisplayUnit::Meters
            | DisplayUnit::Fahrenheit
            | DisplayUnit::Celsius
            | DisplayUnit::Psi => 0,
            DisplayUnit::Bar | DisplayUnit::Pound | DisplayUnit::Kilogram => 1,
        }
    }

    /// Ensure the unit measures `expected`.
    ///
    /// # Errors
    /// Returns `ConversionError::WrongQuantity` when the unit belongs to another quantity.
    pub fn expect_quantity(self, expected: Quantity) -> Result<Self, ConversionError> {
        if self.quantity() == expected {
            Ok(self)
        } else {
            Err(ConversionError::WrongQuantity {
                unit: self.as_str(),
                expected: expected.as_str(),
            })
        }
    }
}

/// A display value derived from a canonical measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMeasurement {
    /// `None` when the canonical value is absent.
    pub value: Option<f64>,
    pub unit: DisplayUnit,
}

/// Convert a canonical fixed-point value to its display form.
///
/// A missing canonical value stays missing; it is never rendered as zero.
#[must_use]
pub fn to_display(canonical: Option<i32>, unit: DisplayUnit) -> DisplayMeasurement {
    DisplayMeasurement {
        value: canonical.map(|v| display_value(v, unit)),
        unit,
    }
}

fn display_value(canonical: i32, unit: DisplayUnit) -> f64 {
    let c = f64::from(canonical);
    let raw = match unit {
        DisplayUnit::Meters => c / CM_PER_METER,
        DisplayUnit::Feet => c / CM_PER_METER * FEET_PER_METER,
        DisplayUnit::Celsius => c / TEMPERATURE_SCALE,
        DisplayUnit::Fahrenheit => c / TEMPERATURE_SCALE * 9.0 / 5.0 + 32.0,
        DisplayUnit::Bar => c / PRESSURE_SCALE,
        DisplayUnit::Psi => c / PRESSURE_SCALE * PSI_PER_BAR,
        DisplayUnit::Kilogram => c / GRAMS_PER_KG,
        DisplayUnit::Pound => c / GRAMS_PER_KG * POUNDS_PER_KG,
    };
    round_to(raw, unit.precision())
}

/// Convert a display value back to the canonical fixed-point integer.
///
/// # Errors
/// Returns `ConversionError::NonFinite` for NaN or infinite input and
/// `ConversionError::OutOfRange` when the result does not fit the canonical type.
pub fn to_canonical(display: f64, unit: DisplayUnit) -> Result<i32, ConversionError> {
    if !display.is_finite() {
        return Err(ConversionError::NonFinite);
    }

    let raw = match unit {
        DisplayUnit::Meters => display * CM_PER_METER,
        DisplayUnit::Feet => display / FEET_PER_METER * CM_PER_METER,
        DisplayUnit::Celsius => display * TEMPERATURE_SCALE,
        DisplayUnit::Fahrenheit => (display - 32.0) * 5.0 / 9.0 * TEMPERATURE_SCALE,
        DisplayUnit::Bar => display * PRESSURE_SCALE,
        DisplayUnit::Psi => display / PSI_PER_BAR * PRESSURE_SCALE,
        DisplayUnit::Kilogram => display * GRAMS_PER_KG,
        DisplayUnit::Pound => display / POUNDS_PER_KG * GRAMS_PER_KG,
    };

    // f64::round is half-away-from-zero.
    let rounded = raw.round();
    if rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        return Err(ConversionError::OutOfRange {
            value: display.to_string(),
            unit: unit.as_str(),
        });
    }

    #[allow(clippy::cast_possible_truncation)]
    Ok(rounded as i32)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// The user's chosen display units. Every axis is always defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPreferences {
    pub depth: DepthUnit,
    pub temperature: TemperatureUnit,
    pub pressure: PressureUnit,
    pub weight: WeightUnit,
}

impl Default for UnitPreferences {
    fn default() -> Self {
        Self {
            depth: DepthUnit::Meters,
            temperature: TemperatureUnit::Celsius,
            pressure: PressureUnit::Bar,
            weight: WeightUnit::Kilogram,
        }
    }
}

impl UnitPreferences {
    /// Build a full set from a partial one, defaulting each missing axis on its own.
    #[must_use]
    pub fn from_partial(partial: &UnitPreferencesPatch) -> Self {
        Self::default().apply(partial)
    }

    /// Merge a partial update into this set.
    #[must_use]
    pub fn apply(self, patch: &UnitPreferencesPatch) -> Self {
        Self {
            depth: patch.depth.unwrap_or(self.depth),
            temperature: patch.temperature.unwrap_or(self.temperature),
            pressure: patch.pressure.unwrap_or(self.pressure),
            weight: patch.weight.unwrap_or(self.weight),
        }
    }

    /// The preferred display unit for a quantity.
    #[must_use]
    pub fn unit_for(&self, quantity: Quantity) -> DisplayUnit {
        match quantity {
            Quantity::Depth => self.depth.into(),
            Quantity::Temperature => self.temperature.into(),
            Quantity::Pressure => self.pressure.into(),
            Quantity::Weight => self.weight.into(),
        }
    }

    /// Render a canonical value of `quantity` in the preferred unit.
    #[must_use]
    pub fn display(&self, quantity: Quantity, canonical: Option<i32>) -> DisplayMeasurement {
        to_display(canonical, self.unit_for(quantity))
    }
}

/// Partial update of unit preferences. `None` leaves an axis untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitPreferencesPatch {
    pub depth: Option<DepthUnit>,
    pub temperature: Option<TemperatureUnit>,
    pub pressure: Option<PressureUnit>,
    pub weight: Option<WeightUnit>,
}

impl UnitPreferencesPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depth.is_none()
            && self.temperature.is_none()
            && self.pressure.is_none()
            && self.weight.is_none()
    }
}

impl From<UnitPreferences> for UnitPreferencesPatch {
    fn from(prefs: UnitPreferences) -> Self {
        Self {
            depth: Some(prefs.depth),
            temperature: Some(prefs.temperature),
            pressure: Some(prefs.pressure),
            weight: Some(prefs.weight),
        }
    }
}
