//! Postgres-backed profile store and change listener.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::{BaseProfileStore, ProfileHub, StoreError};
use crate::common::UserId;
use crate::domains::profiles::models::{NewProfile, Profile, ProfileUpdate};

/// Channel the `profiles` update trigger notifies with the owner's user id.
pub const PROFILE_CHANGES_CHANNEL: &str = "profile_changes";

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl BaseProfileStore for PgProfileStore {
    async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, StoreError> {
        Profile::find_by_user_id(user_id, &self.pool)
            .await
            .context("Failed to load profile")
            .map_err(StoreError::Backend)
    }

    async fn insert_profile(&self, new: NewProfile) -> Result<Profile, StoreError> {
        match Profile::insert(&new, &self.pool).await {
            Ok(profile) => Ok(profile),
            Err(e) if is_unique_violation(&e) => Err(StoreError::AlreadyExists),
            Err(e) => Err(anyhow::Error::new(e)
                .context("Failed to insert profile")
                .into()),
        }
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError> {
        Profile::update(user_id, &update, &self.pool)
            .await
            .context("Failed to update profile")?
            .ok_or(StoreError::NotFound)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        match tokio::time::timeout(
            Duration::from_secs(5),
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(anyhow::Error::new(e).context("Query failed").into()),
            Err(_) => Err(anyhow::anyhow!("Query timeout (>5s)").into()),
        }
    }
}

const RECONNECT_DELAY_MIN: Duration = Duration::from_secs(1);
const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(30);

fn next_reconnect_delay(current: Duration) -> Duration {
    (current * 2).min(RECONNECT_DELAY_MAX)
}

/// Forward `profile_changes` notifications into the hub so changes made
/// outside this process (an admin approving a seller) reach open streams.
///
/// Never returns. When the listener connection fails it reconnects with
/// exponential backoff, then republishes the profiles of everyone still
/// watching, since notifications sent while disconnected are lost.
pub async fn listen_for_profile_changes(
    pool: &PgPool,
    store: Arc<dyn BaseProfileStore>,
    hub: ProfileHub,
) {
    let mut delay = RECONNECT_DELAY_MIN;

    loop {
        let mut listener = match connect_listener(pool).await {
            Ok(listener) => listener,
            Err(e) => {
                warn!(
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Profile change listener unavailable, retrying"
                );
                sleep(delay).await;
                delay = next_reconnect_delay(delay);
                continue;
            }
        };

        info!(channel = PROFILE_CHANGES_CHANNEL, "Listening for profile changes");
        delay = RECONNECT_DELAY_MIN;

        for user_id in hub.watched_users().await {
            reload_and_publish(user_id, store.as_ref(), &hub).await;
        }

        if let Err(e) = forward_notifications(&mut listener, store.as_ref(), &hub).await {
            warn!(error = %e, "Profile change listener dropped, reconnecting");
        }
    }
}

async fn connect_listener(pool: &PgPool) -> anyhow::Result<PgListener> {
    let mut listener = PgListener::connect_with(pool)
        .await
        .context("Failed to open profile change listener")?;
    listener
        .listen(PROFILE_CHANGES_CHANNEL)
        .await
        .context("Failed to LISTEN on profile_changes")?;
    Ok(listener)
}

/// Returns only when the connection fails or closes. `try_recv` is used
/// over `recv` so a dropped connection surfaces here instead of being
/// reconnected silently, which would skip the republish.
async fn forward_notifications(
    listener: &mut PgListener,
    store: &dyn BaseProfileStore,
    hub: &ProfileHub,
) -> anyhow::Result<()> {
    loop {
        let notification = listener
            .try_recv()
            .await
            .context("Profile change listener failed")?
            .ok_or_else(|| anyhow::anyhow!("Profile change listener connection closed"))?;

        match UserId::parse(notification.payload()) {
            Ok(user_id) => reload_and_publish(user_id, store, hub).await,
            Err(e) => {
                warn!(payload = notification.payload(), error = %e, "Ignoring malformed profile notification");
            }
        }
        hub.cleanup().await;
    }
}

async fn reload_and_publish(user_id: UserId, store: &dyn BaseProfileStore, hub: &ProfileHub) {
    match store.get_profile(user_id).await {
        Ok(Some(profile)) => {
            debug!(user_id = %user_id, is_verified = profile.is_verified, "Profile changed");
            hub.publish(&profile).await;
        }
        Ok(None) => {}
        Err(e) => error!(user_id = %user_id, error = %e, "Failed to reload changed profile"),
    }
}
