use tokio::sync::broadcast;

use super::resolver::PreferenceSource;
use crate::units::UnitPreferences;

const DEFAULT_CAPACITY: usize = 16;

/// A preference change seen by every subscriber of a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceChange {
    pub preferences: UnitPreferences,
    pub source: PreferenceSource,
}

/// Publish/subscribe channel scoped to one client session.
///
/// Clones share the same channel.
#[derive(Debug, Clone)]
pub struct PreferenceBus {
    tx: broadcast::Sender<PreferenceChange>,
}

impl Default for PreferenceBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PreferenceBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Notify all current subscribers. Returns how many received the change.
    #[must_use]
    pub fn publish(&self, change: PreferenceChange) -> usize {
        self.tx.send(change).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PreferenceChange> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn change() -> PreferenceChange {
        PreferenceChange {
            preferences: UnitPreferences::default(),
            source: PreferenceSource::Guest,
        }
    }

    #[test]
    fn publish_without_subscribers_delivers_nothing() {
        let bus = PreferenceBus::default();
        assert_eq!(bus.publish(change()), 0);
    }

    #[tokio::test]
    async fn clones_share_one_channel() {
        let bus = PreferenceBus::new(4);
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        assert_eq!(bus.clone().publish(change()), 2);
        assert_eq!(first.recv().await.unwrap(), change());
        assert_eq!(second.recv().await.unwrap(), change());
    }
}
