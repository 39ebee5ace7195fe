use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;
use tokio::sync::{broadcast, watch};

use super::bus::{PreferenceBus, PreferenceChange};
use super::store::{GUEST_PREFERENCES_KEY, LocalStore, decode_guest, encode_guest};
use crate::api::UnitPreferencesClientV1;
use crate::context::SecurityContext;
use crate::errors::DiveLogError;
use crate::units::{UnitPreferences, UnitPreferencesPatch};

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("local preference store failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("stored preferences could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("server rejected preference update: {0}")]
    Remote(#[from] DiveLogError),

    #[error("authenticated preferences requested without a session")]
    NotAuthenticated,
}

/// Which store a consumer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferenceMode {
    /// Authenticated when a session exists, guest otherwise.
    #[default]
    Auto,
    Guest,
    Authenticated,
}

/// Current session as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Guest,
    Authenticated(SecurityContext),
}

/// Store a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceSource {
    Guest,
    Authenticated,
}

enum Backend<'a> {
    Guest,
    Remote(&'a Arc<dyn UnitPreferencesClientV1>, SecurityContext),
    Unavailable,
}

/// Reads and writes unit preferences from the store the mode and session select.
pub struct UnitPreferencesResolver {
    mode: PreferenceMode,
    local: Arc<dyn LocalStore>,
    remote: Option<Arc<dyn UnitPreferencesClientV1>>,
    session: watch::Receiver<SessionState>,
    bus: PreferenceBus,
    cache: ArcSwap<UnitPreferences>,
}

impl UnitPreferencesResolver {
    /// Guest-only resolver. Use [`Self::with_remote`] to enable authenticated storage.
    #[must_use]
    pub fn new(local: Arc<dyn LocalStore>, bus: PreferenceBus) -> Self {
        // Sender dropped: the session stays Guest forever.
        let (_, session) = watch::channel(SessionState::Guest);
        Self {
            mode: PreferenceMode::Auto,
            local,
            remote: None,
            session,
            bus,
            cache: ArcSwap::from_pointee(UnitPreferences::default()),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: PreferenceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Attach the server client and the session it should follow.
    #[must_use]
    pub fn with_remote(
        mut self,
        client: Arc<dyn UnitPreferencesClientV1>,
        session: watch::Receiver<SessionState>,
    ) -> Self {
        self.remote = Some(client);
        self.session = session;
        self
    }

    #[must_use]
    pub fn mode(&self) -> PreferenceMode {
        self.mode
    }

    /// Last preferences read or written by this resolver.
    #[must_use]
    pub fn current(&self) -> UnitPreferences {
        **self.cache.load()
    }

    /// Receive changes made by any resolver sharing this bus.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PreferenceChange> {
        self.bus.subscribe()
    }

    fn backend(&self) -> Backend<'_> {
        let session = *self.session.borrow();
        match (self.mode, session, self.remote.as_ref()) {
            (PreferenceMode::Guest, _, _)
            | (PreferenceMode::Auto, SessionState::Guest, _)
            | (PreferenceMode::Auto, SessionState::Authenticated(_), None) => Backend::Guest,
            (
                PreferenceMode::Auto | PreferenceMode::Authenticated,
                SessionState::Authenticated(ctx),
                Some(client),
            ) => Backend::Remote(client, ctx),
            (PreferenceMode::Authenticated, _, _) => Backend::Unavailable,
        }
    }

    /// The store the next call would use, or `None` when no store is usable.
    #[must_use]
    pub fn source(&self) -> Option<PreferenceSource> {
        match self.backend() {
            Backend::Guest => Some(PreferenceSource::Guest),
            Backend::Remote(..) => Some(PreferenceSource::Authenticated),
            Backend::Unavailable => None,
        }
    }

    /// Load preferences. Never fails: any read error yields defaults.
    pub async fn get_preferences(&self) -> UnitPreferences {
        let prefs = match self.backend() {
            Backend::Guest => self.read_guest().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read guest preferences, using defaults");
                UnitPreferences::default()
            }),
            Backend::Remote(client, ctx) => {
                client.get_preferences(&ctx).await.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to fetch preferences, using defaults");
                    UnitPreferences::default()
                })
            }
            Backend::Unavailable => UnitPreferences::default(),
        };
        self.cache.store(Arc::new(prefs));
        prefs
    }

    /// Merge `patch` into the stored preferences and persist the full set.
    ///
    /// # Errors
    /// Returns `PreferencesError` when the selected store rejects the write or
    /// when authenticated storage is forced without a session. On a failed
    /// authenticated write the cached value is rolled back, unless another
    /// write has replaced it in the meantime.
    pub async fn set_preferences(
        &self,
        patch: UnitPreferencesPatch,
    ) -> Result<UnitPreferences, PreferencesError> {
        match self.backend() {
            Backend::Guest => {
                let base = self.read_guest().unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "Unreadable guest preferences, merging over defaults");
                    UnitPreferences::default()
                });
                let merged = base.apply(&patch);
                self.local
                    .set(GUEST_PREFERENCES_KEY, &encode_guest(&merged)?)?;
                self.commit(merged, PreferenceSource::Guest);
                Ok(merged)
            }
            Backend::Remote(client, ctx) => {
                let previous = self.cache.load_full();
                let optimistic = Arc::new(previous.apply(&patch));
                self.cache.store(Arc::clone(&optimistic));

                match client.patch_preferences(&ctx, patch).await {
                    Ok(saved) => {
                        self.commit(saved, PreferenceSource::Authenticated);
                        Ok(saved)
                    }
                    Err(e) => {
                        // Only undo our own optimistic value; a newer write wins.
                        let seen = self.cache.compare_and_swap(&optimistic, previous);
                        if Arc::ptr_eq(&*seen, &optimistic) {
                            tracing::warn!(error = %e, "Preference update failed, rolled back");
                        } else {
                            tracing::warn!(error = %e, "Preference update failed, newer value kept");
                        }
                        Err(e.into())
                    }
                }
            }
            Backend::Unavailable => Err(PreferencesError::NotAuthenticated),
        }
    }

    fn read_guest(&self) -> Result<UnitPreferences, PreferencesError> {
        match self.local.get(GUEST_PREFERENCES_KEY)? {
            Some(raw) => Ok(decode_guest(&raw)?),
            None => Ok(UnitPreferences::default()),
        }
    }

    fn commit(&self, preferences: UnitPreferences, source: PreferenceSource) {
        self.cache.store(Arc::new(preferences));
        let delivered = self.bus.publish(PreferenceChange {
            preferences,
            source,
        });
        tracing::trace!(delivered, ?source, "Published preference change");
    }
}
