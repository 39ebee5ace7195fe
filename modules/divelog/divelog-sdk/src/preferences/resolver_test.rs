#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, watch};
use uuid::Uuid;

use super::*;
use crate::api::UnitPreferencesClientV1;
use crate::context::SecurityContext;
use crate::errors::DiveLogError;
use crate::units::{
    DepthUnit, PressureUnit, TemperatureUnit, UnitPreferences, UnitPreferencesPatch, WeightUnit,
};

struct MockClient {
    stored: Mutex<UnitPreferences>,
    fail_writes: bool,
    fail_reads: bool,
}

impl MockClient {
    fn new(stored: UnitPreferences) -> Self {
        Self {
            stored: Mutex::new(stored),
            fail_writes: false,
            fail_reads: false,
        }
    }
}

#[async_trait]
impl UnitPreferencesClientV1 for MockClient {
    async fn get_preferences(
        &self,
        _ctx: &SecurityContext,
    ) -> Result<UnitPreferences, DiveLogError> {
        if self.fail_reads {
            return Err(DiveLogError::internal());
        }
        Ok(*self.stored.lock())
    }

    async fn patch_preferences(
        &self,
        _ctx: &SecurityContext,
        patch: UnitPreferencesPatch,
    ) -> Result<UnitPreferences, DiveLogError> {
        if self.fail_writes {
            return Err(DiveLogError::internal());
        }
        let mut stored = self.stored.lock();
        *stored = stored.apply(&patch);
        Ok(*stored)
    }
}

/// Depth changes wait until another patch has been saved, then fail.
struct GatedClient {
    stored: Mutex<UnitPreferences>,
    gate: Notify,
}

#[async_trait]
impl UnitPreferencesClientV1 for GatedClient {
    async fn get_preferences(
        &self,
        _ctx: &SecurityContext,
    ) -> Result<UnitPreferences, DiveLogError> {
        Ok(*self.stored.lock())
    }

    async fn patch_preferences(
        &self,
        _ctx: &SecurityContext,
        patch: UnitPreferencesPatch,
    ) -> Result<UnitPreferences, DiveLogError> {
        if patch.depth.is_some() {
            self.gate.notified().await;
            return Err(DiveLogError::internal());
        }
        let saved = {
            let mut stored = self.stored.lock();
            *stored = stored.apply(&patch);
            *stored
        };
        self.gate.notify_one();
        Ok(saved)
    }
}

struct BrokenStore;

impl LocalStore for BrokenStore {
    fn get(&self, _key: &str) -> io::Result<Option<String>> {
        Err(io::Error::other("disk on fire"))
    }

    fn set(&self, _key: &str, _value: &str) -> io::Result<()> {
        Err(io::Error::other("disk on fire"))
    }
}

fn imperial() -> UnitPreferences {
    UnitPreferences {
        depth: DepthUnit::Feet,
        temperature: TemperatureUnit::Fahrenheit,
        pressure: PressureUnit::Psi,
        weight: WeightUnit::Pound,
    }
}

fn authenticated() -> watch::Receiver<SessionState> {
    let (tx, rx) = watch::channel(SessionState::Authenticated(SecurityContext::new(
        Uuid::new_v4(),
        0,
    )));
    // Keep the value alive after the sender goes away.
    drop(tx);
    rx
}

#[tokio::test]
async fn guest_change_is_seen_by_other_consumers_on_the_same_bus() {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryLocalStore::new());
    let bus = PreferenceBus::default();
    let header_widget = UnitPreferencesResolver::new(store.clone(), bus.clone());
    let dive_table = UnitPreferencesResolver::new(store, bus);
    let mut rx = dive_table.subscribe();

    let patch = UnitPreferencesPatch {
        depth: Some(DepthUnit::Feet),
        ..UnitPreferencesPatch::default()
    };
    header_widget.set_preferences(patch).await.unwrap();

    let change = rx.try_recv().unwrap();
    assert_eq!(change.source, PreferenceSource::Guest);
    assert_eq!(change.preferences.depth, DepthUnit::Feet);
    assert_eq!(dive_table.get_preferences().await.depth, DepthUnit::Feet);
}

#[tokio::test]
async fn guest_set_merges_partial_update_into_stored_set() {
    let store = Arc::new(MemoryLocalStore::new());
    store
        .set(GUEST_PREFERENCES_KEY, r#"{"depth":"ft","temperature":"f"}"#)
        .unwrap();
    let resolver = UnitPreferencesResolver::new(store.clone(), PreferenceBus::default());

    let merged = resolver
        .set_preferences(UnitPreferencesPatch {
            weight: Some(WeightUnit::Pound),
            ..UnitPreferencesPatch::default()
        })
        .await
        .unwrap();

    assert_eq!(merged.depth, DepthUnit::Feet);
    assert_eq!(merged.temperature, TemperatureUnit::Fahrenheit);
    assert_eq!(merged.pressure, PressureUnit::Bar);
    assert_eq!(merged.weight, WeightUnit::Pound);

    let raw = store.get(GUEST_PREFERENCES_KEY).unwrap().unwrap();
    assert!(raw.contains(r#""weight":"lb""#));
    assert!(raw.contains(r#""pressure":"bar""#));
}

#[tokio::test]
async fn unreadable_guest_store_degrades_to_defaults() {
    let resolver = UnitPreferencesResolver::new(Arc::new(BrokenStore), PreferenceBus::default());
    assert_eq!(resolver.get_preferences().await, UnitPreferences::default());

    let err = resolver
        .set_preferences(UnitPreferencesPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PreferencesError::Storage(_)));
}

#[tokio::test]
async fn corrupt_guest_record_degrades_to_defaults() {
    let store = Arc::new(MemoryLocalStore::new());
    store.set(GUEST_PREFERENCES_KEY, "not json").unwrap();
    let resolver = UnitPreferencesResolver::new(store, PreferenceBus::default());
    assert_eq!(resolver.get_preferences().await, UnitPreferences::default());
}

#[tokio::test]
async fn auto_mode_follows_the_session() {
    let client = Arc::new(MockClient::new(imperial()));
    let (tx, rx) = watch::channel(SessionState::Guest);
    let resolver = UnitPreferencesResolver::new(
        Arc::new(MemoryLocalStore::new()),
        PreferenceBus::default(),
    )
    .with_remote(client, rx);

    assert_eq!(resolver.source(), Some(PreferenceSource::Guest));
    assert_eq!(resolver.get_preferences().await, UnitPreferences::default());

    tx.send(SessionState::Authenticated(SecurityContext::new(
        Uuid::new_v4(),
        3,
    )))
    .unwrap();

    assert_eq!(resolver.source(), Some(PreferenceSource::Authenticated));
    assert_eq!(resolver.get_preferences().await, imperial());
    assert_eq!(resolver.current(), imperial());
}

#[tokio::test]
async fn forced_guest_ignores_an_authenticated_session() {
    let resolver = UnitPreferencesResolver::new(
        Arc::new(MemoryLocalStore::new()),
        PreferenceBus::default(),
    )
    .with_remote(Arc::new(MockClient::new(imperial())), authenticated())
    .with_mode(PreferenceMode::Guest);

    assert_eq!(resolver.source(), Some(PreferenceSource::Guest));
    assert_eq!(resolver.get_preferences().await, UnitPreferences::default());
}

#[tokio::test]
async fn forced_authenticated_without_session_cannot_write() {
    let resolver = UnitPreferencesResolver::new(
        Arc::new(MemoryLocalStore::new()),
        PreferenceBus::default(),
    )
    .with_mode(PreferenceMode::Authenticated);

    assert_eq!(resolver.source(), None);
    assert_eq!(resolver.get_preferences().await, UnitPreferences::default());
    let err = resolver
        .set_preferences(UnitPreferencesPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PreferencesError::NotAuthenticated));
}

#[tokio::test]
async fn authenticated_write_publishes_saved_value() {
    let client = Arc::new(MockClient::new(UnitPreferences::default()));
    let resolver = UnitPreferencesResolver::new(
        Arc::new(MemoryLocalStore::new()),
        PreferenceBus::default(),
    )
    .with_remote(client.clone(), authenticated());
    let mut rx = resolver.subscribe();

    let saved = resolver
        .set_preferences(UnitPreferencesPatch {
            pressure: Some(PressureUnit::Psi),
            ..UnitPreferencesPatch::default()
        })
        .await
        .unwrap();

    assert_eq!(saved.pressure, PressureUnit::Psi);
    assert_eq!(client.stored.lock().pressure, PressureUnit::Psi);
    let change = rx.try_recv().unwrap();
    assert_eq!(change.source, PreferenceSource::Authenticated);
    assert_eq!(change.preferences, saved);
}

#[tokio::test]
async fn failed_authenticated_write_rolls_back_cache() {
    let mut client = MockClient::new(imperial());
    client.fail_writes = true;
    let resolver = UnitPreferencesResolver::new(
        Arc::new(MemoryLocalStore::new()),
        PreferenceBus::default(),
    )
    .with_remote(Arc::new(client), authenticated());
    let mut rx = resolver.subscribe();

    assert_eq!(resolver.get_preferences().await, imperial());

    let err = resolver
        .set_preferences(UnitPreferencesPatch {
            depth: Some(DepthUnit::Meters),
            ..UnitPreferencesPatch::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PreferencesError::Remote(DiveLogError::Internal)));
    assert_eq!(resolver.current(), imperial());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn failed_authenticated_read_degrades_to_defaults() {
    let mut client = MockClient::new(imperial());
    client.fail_reads = true;
    let resolver = UnitPreferencesResolver::new(
        Arc::new(MemoryLocalStore::new()),
        PreferenceBus::default(),
    )
    .with_remote(Arc::new(client), authenticated());

    assert_eq!(resolver.get_preferences().await, UnitPreferences::default());
}

#[tokio::test]
async fn guest_preferences_survive_a_new_resolver_on_the_same_directory() {
    let dir = tempfile::tempdir().unwrap();
    let first = UnitPreferencesResolver::new(
        Arc::new(FileLocalStore::new(dir.path())),
        PreferenceBus::default(),
    );
    first
        .set_preferences(UnitPreferencesPatch {
            temperature: Some(TemperatureUnit::Fahrenheit),
            ..UnitPreferencesPatch::default()
        })
        .await
        .unwrap();

    let second = UnitPreferencesResolver::new(
        Arc::new(FileLocalStore::new(dir.path())),
        PreferenceBus::default(),
    );
    let prefs = second.get_preferences().await;
    assert_eq!(prefs.temperature, TemperatureUnit::Fahrenheit);
    assert_eq!(prefs.depth, DepthUnit::Meters);
}

#[tokio::test]
async fn failed_write_does_not_undo_a_later_successful_write() {
    let client = Arc::new(GatedClient {
        stored: Mutex::new(imperial()),
        gate: Notify::new(),
    });
    let resolver = UnitPreferencesResolver::new(
        Arc::new(MemoryLocalStore::new()),
        PreferenceBus::default(),
    )
    .with_remote(client.clone(), authenticated());
    assert_eq!(resolver.get_preferences().await, imperial());

    let (depth, temperature) = tokio::join!(
        resolver.set_preferences(UnitPreferencesPatch {
            depth: Some(DepthUnit::Meters),
            ..UnitPreferencesPatch::default()
        }),
        resolver.set_preferences(UnitPreferencesPatch {
            temperature: Some(TemperatureUnit::Celsius),
            ..UnitPreferencesPatch::default()
        }),
    );

    assert!(depth.is_err());
    let saved = temperature.unwrap();
    assert_eq!(saved.temperature, TemperatureUnit::Celsius);
    assert_eq!(resolver.current(), saved);
    assert_eq!(resolver.current(), *client.stored.lock());
    assert_eq!(resolver.current().depth, DepthUnit::Feet);
}
