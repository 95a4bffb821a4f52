//! SSE profile-state stream.
//!
//! GET /streams/profile
//!
//! Replaces polling on the pending-review page. The stream emits the
//! current verification state first, then one event per state change, and
//! ends after `verified`. Closing the page drops the stream, which drops the
//! hub subscription and prunes the user's channel.
//!
//! Auth: the session cookie (or Bearer header) resolved by
//! `session_auth_middleware`. Not behind the access guard.

use std::convert::Infallible;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, BoxStream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, error};

use crate::domains::profiles::models::{Profile, VerificationState};
use crate::kernel::{ChannelRelease, ServerDeps};
use crate::server::middleware::CurrentUser;

/// Collapses repeated states and stops after `verified`.
#[derive(Debug, Default)]
struct StateTracker {
    last: Option<VerificationState>,
    finished: bool,
}

impl StateTracker {
    /// The state to emit for `profile`, if it changed.
    fn advance(&mut self, profile: &Profile) -> Option<VerificationState> {
        let state = VerificationState::of(profile);
        if self.last == Some(state) {
            return None;
        }
        self.last = Some(state);
        self.finished = state == VerificationState::Verified;
        Some(state)
    }
}

fn state_event(state: VerificationState, profile: &Profile) -> Event {
    let payload = serde_json::json!({ "type": state, "profile": profile });
    Event::default()
        .event(state.as_str())
        .json_data(&payload)
        .unwrap_or_else(|_| Event::default().event(state.as_str()))
}

/// Current profile first, then hub updates. `release` lives as long as the
/// stream, so the hub channel is pruned whether the stream finishes or the
/// client goes away.
fn state_events(
    current: Profile,
    updates: BoxStream<'static, Profile>,
    release: ChannelRelease,
) -> impl futures::Stream<Item = Result<Event, Infallible>> {
    let profiles = stream::once(async move { current }).chain(updates).boxed();

    stream::unfold(
        (profiles, StateTracker::default(), release),
        |(mut profiles, mut tracker, release)| async move {
            if tracker.finished {
                return None;
            }
            loop {
                let profile = profiles.next().await?;
                if let Some(state) = tracker.advance(&profile) {
                    let event = state_event(state, &profile);
                    return Some((Ok(event), (profiles, tracker, release)));
                }
            }
        },
    )
}

pub async fn profile_stream_handler(
    Extension(deps): Extension<ServerDeps>,
    user: Option<CurrentUser>,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let CurrentUser(user) = user.ok_or(StatusCode::UNAUTHORIZED)?;

    deps.profile_hub.cleanup().await;
    // Subscribe before reading so a change in between is not lost
    let rx = deps.profile_hub.subscribe(user.user_id).await;

    let current = deps
        .profiles
        .get_profile(user.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load profile for stream");
            StatusCode::SERVICE_UNAVAILABLE
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    debug!(user_id = %user.user_id, "Profile stream opened");

    // Lagged receivers skip ahead; the next profile carries the full state
    let updates = BroadcastStream::new(rx)
        .filter_map(|result| async move { result.ok() })
        .boxed();

    let release = deps.profile_hub.release_on_drop(user.user_id);
    Ok(Sse::new(state_events(current, updates, release)).keep_alive(KeepAlive::default()))
}
