//! Dive log module
//!
//! Accounts with versioned sessions, unit preferences, dive logs, dive plans,
//! certifications and gear. The public contract lives in `divelog-sdk` and is
//! re-exported here.

pub use divelog_sdk::{
    DiveLogError, SecurityContext, UnitPreferences, UnitPreferencesClientV1, UnitPreferencesPatch,
};

pub mod module;
pub use module::DiveLogModule;

pub mod local_client;

pub use config::DiveLogConfig;
pub use infra::storage::migrations::Migrator;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod auth;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
