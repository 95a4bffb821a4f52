//! In-process pub/sub hub for profile state changes.
//!
//! Topic-keyed broadcast channels, one per user, feeding the
//! `/streams/profile` SSE endpoint.
//!
//! # Usage
//!
//! Producers (profile actions, the Postgres change listener):
//!   hub.publish(&profile).await;
//!
//! Consumers (SSE endpoint):
//!   let rx = hub.subscribe(user_id).await;
//!   let _release = hub.release_on_drop(user_id);

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::common::UserId;
use crate::domains::profiles::models::Profile;

/// Thread-safe, cloneable. Keyed by the profile's owner.
#[derive(Clone)]
pub struct ProfileHub {
    channels: Arc<RwLock<HashMap<UserId, broadcast::Sender<Profile>>>>,
    capacity: usize,
}

impl ProfileHub {
    /// Create a new hub with default capacity (16 messages per channel).
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish the new state of a profile. No-op if nobody is watching.
    pub async fn publish(&self, profile: &Profile) {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(&profile.user_id) {
            // Ignore send errors (no active receivers)
            let _ = tx.send(profile.clone());
        }
    }

    /// Subscribe to a user's profile changes. Creates the channel if needed.
    pub async fn subscribe(&self, user_id: UserId) -> broadcast::Receiver<Profile> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    /// Remove channels with zero subscribers.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
    }

    /// Remove one user's channel if it has no subscribers left.
    pub async fn release(&self, user_id: UserId) {
        let mut channels = self.channels.write().await;
        if channels
            .get(&user_id)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(&user_id);
        }
    }

    /// Guard that calls `release` for `user_id` when dropped. Consumers hold
    /// it next to their receiver so the channel goes away with them.
    pub fn release_on_drop(&self, user_id: UserId) -> ChannelRelease {
        ChannelRelease {
            hub: self.clone(),
            user_id,
        }
    }

    /// Users with at least one live subscriber.
    pub async fn watched_users(&self) -> Vec<UserId> {
        self.channels
            .read()
            .await
            .iter()
            .filter(|(_, tx)| tx.receiver_count() > 0)
            .map(|(user_id, _)| *user_id)
            .collect()
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for ProfileHub {
    fn default() -> Self {
        Self::new()
    }
}

/// See `ProfileHub::release_on_drop`.
pub struct ChannelRelease {
    hub: ProfileHub,
    user_id: UserId,
}

impl Drop for ChannelRelease {
    fn drop(&mut self) {
        // Runs after the sibling receiver is gone; outside a runtime there is
        // nothing left to prune for.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let hub = self.hub.clone();
            let user_id = self.user_id;
            handle.spawn(async move { hub.release(user_id).await });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::profiles::models::Role;

    #[tokio::test]
    async fn test_publish_subscribe_roundtrip() {
        let hub = ProfileHub::new();
        let profile = Profile::fixture(UserId::new(), Role::Seller, false);
        let mut rx = hub.subscribe(profile.user_id).await;

        hub.publish(&profile).await;

        assert_eq!(rx.recv().await.unwrap(), profile);
    }

    #[tokio::test]
    async fn test_publish_is_scoped_to_owner() {
        let hub = ProfileHub::new();
        let watched = UserId::new();
        let mut rx = hub.subscribe(watched).await;

        hub.publish(&Profile::fixture(UserId::new(), Role::Seller, true))
            .await;

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_publish_no_subscribers_is_noop() {
        let hub = ProfileHub::new();
        hub.publish(&Profile::fixture(UserId::new(), Role::Buyer, true))
            .await;
        assert_eq!(hub.channel_count().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_removes_empty_channels() {
        let hub = ProfileHub::new();
        let rx = hub.subscribe(UserId::new()).await;
        assert_eq!(hub.channel_count().await, 1);

        drop(rx);
        hub.cleanup().await;

        assert_eq!(hub.channel_count().await, 0);
    }

    async fn wait_for_channel_count(hub: &ProfileHub, expected: usize) {
        for _ in 0..100 {
            if hub.channel_count().await == expected {
                return;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(hub.channel_count().await, expected);
    }

    #[tokio::test]
    async fn test_release_on_drop_prunes_channel() {
        let hub = ProfileHub::new();
        let user_id = UserId::new();
        let rx = hub.subscribe(user_id).await;
        let guard = hub.release_on_drop(user_id);

        drop((rx, guard));

        wait_for_channel_count(&hub, 0).await;
    }

    #[tokio::test]
    async fn test_release_keeps_channel_with_other_subscribers() {
        let hub = ProfileHub::new();
        let user_id = UserId::new();
        let _second_tab = hub.subscribe(user_id).await;
        let rx = hub.subscribe(user_id).await;
        let guard = hub.release_on_drop(user_id);

        drop((rx, guard));
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(hub.channel_count().await, 1);
        assert_eq!(hub.watched_users().await, vec![user_id]);
    }

    #[tokio::test]
    async fn test_watched_users_skips_abandoned_channels() {
        let hub = ProfileHub::new();
        let abandoned = UserId::new();
        drop(hub.subscribe(abandoned).await);

        assert!(hub.watched_users().await.is_empty());
        assert_eq!(hub.channel_count().await, 1);
    }
}
