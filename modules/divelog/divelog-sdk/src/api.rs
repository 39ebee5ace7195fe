//! `UnitPreferencesClientV1` trait definition.
//!
//! This trait defines the public API for unit preferences (Version 1).
//! All methods require a `SecurityContext` identifying the caller.

use async_trait::async_trait;

use crate::context::SecurityContext;
use crate::errors::DiveLogError;
use crate::units::{UnitPreferences, UnitPreferencesPatch};

/// Public API trait for the authenticated preference store (Version 1).
///
/// The server module provides an in-process implementation; the client-side
/// resolver uses it for authenticated sessions.
#[async_trait]
pub trait UnitPreferencesClientV1: Send + Sync {
    /// Get preferences for the current user.
    /// Returns defaults for every axis that was never set.
    async fn get_preferences(&self, ctx: &SecurityContext)
    -> Result<UnitPreferences, DiveLogError>;

    /// Partially update preferences (PATCH semantics).
    /// Returns the merged full set.
    async fn patch_preferences(
        &self,
        ctx: &SecurityContext,
        patch: UnitPreferencesPatch,
    ) -> Result<UnitPreferences, DiveLogError>;
}
