//! DiveLog SDK
//!
//! This crate provides the public contract of the divelog module:
//! - Unit conversion between canonical fixed-point storage and display units
//! - Model types (`DiveLog`, `Certification`, `GearKit`, ...)
//! - `UnitPreferencesClientV1` trait for reading and writing unit preferences
//! - Error types (`DiveLogError`, `ConversionError`)
//! - A client-side preference resolver that picks guest or authenticated storage
//!
//! Consumers obtain a client from the server module and hand it to the resolver:
//! ```ignore
//! let resolver = UnitPreferencesResolver::new(local_store, bus)
//!     .with_remote(client, session_rx);
//! let prefs = resolver.get_preferences().await;
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod context;
pub mod errors;
pub mod models;
pub mod preferences;
pub mod units;

pub use api::UnitPreferencesClientV1;
pub use context::SecurityContext;
pub use errors::DiveLogError;
pub use models::{
    Certification, CertificationCategory, CertificationDefinition, DiveLog, DiveLogDraft,
    DivePlan, DivePlanDraft, GearItem, GearItemDraft, GearKind, GearKit, GearKitDraft,
    NewCertification, UserProfile,
};
pub use units::{
    ConversionError, DepthUnit, DisplayMeasurement, DisplayUnit, PressureUnit, Quantity,
    TemperatureUnit, UnitPreferences, UnitPreferencesPatch, WeightUnit,
};
