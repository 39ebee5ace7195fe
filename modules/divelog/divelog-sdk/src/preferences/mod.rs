//! Client-side unit preference resolution.
//!
//! A consumer reads and writes preferences through [`UnitPreferencesResolver`],
//! which picks one of two backing stores:
//! - guest: a [`LocalStore`] under [`GUEST_PREFERENCES_KEY`]
//! - authenticated: the server through [`crate::UnitPreferencesClientV1`]
//!
//! Consumers sharing a [`PreferenceBus`] see each other's changes.

mod bus;
mod resolver;
mod store;

#[cfg(test)]
mod resolver_test;

pub use bus::{PreferenceBus, PreferenceChange};
pub use resolver::{
    PreferenceMode, PreferenceSource, PreferencesError, SessionState, UnitPreferencesResolver,
};
pub use store::{FileLocalStore, GUEST_PREFERENCES_KEY, LocalStore, MemoryLocalStore};
