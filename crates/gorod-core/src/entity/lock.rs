// Lock entity.
//
// The vendor API only has an "open" action, so the lock/unlock surface is
// an optimistic client-side state machine:
//
//   Locked -> Unlocking -> Unlocked -> (relock timer) -> Locked
//                      \-> Jammed     (transport failure)
//
// The relock timer is a cancellable task tied to this entity: re-unlocking
// cancels and replaces it, and dropping the entity cancels it outright, so
// no timer outlives its lock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::model::Lock;

/// Relock delay after a successful open.
const DEFAULT_RELOCK_DELAY: Duration = Duration::from_secs(5);

/// Client-side lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocking,
    Unlocked,
    Jammed,
}

struct RelockTimer {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct LockEntity {
    coordinator: Arc<Coordinator>,
    info: Lock,
    state: Arc<Mutex<LockState>>,
    relock_delay: Duration,
    relock: Option<RelockTimer>,
}

impl LockEntity {
    pub fn new(coordinator: Arc<Coordinator>, info: Lock) -> Self {
        Self {
            coordinator,
            info,
            state: Arc::new(Mutex::new(LockState::Locked)),
            relock_delay: DEFAULT_RELOCK_DELAY,
            relock: None,
        }
    }

    /// Override the relock delay (tests, impatient doors).
    pub fn with_relock_delay(mut self, delay: Duration) -> Self {
        self.relock_delay = delay;
        self
    }

    pub fn info(&self) -> &Lock {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn unique_id(&self) -> String {
        let entrance = self
            .info
            .entrance_id
            .map_or_else(|| "none".to_owned(), |id| id.to_string());
        format!(
            "{}_{}_{}_{}",
            self.info.place_id, self.info.access_control_id, entrance, self.info.name
        )
    }

    /// A lock the backend refuses to open is shown but unavailable.
    pub fn is_available(&self) -> bool {
        self.info.openable
    }

    pub fn state(&self) -> LockState {
        *self.state.lock().expect("state lock poisoned")
    }

    pub fn is_locked(&self) -> bool {
        self.state() == LockState::Locked
    }

    pub fn is_jammed(&self) -> bool {
        self.state() == LockState::Jammed
    }

    /// Open the door. Failures jam the lock instead of propagating; a
    /// successful open schedules the relock transition.
    pub async fn unlock(&mut self) -> LockState {
        info!(lock = %self.unique_id(), "unlocking");
        self.set_state(LockState::Unlocking);

        let result = self
            .coordinator
            .open_lock(
                self.info.place_id,
                self.info.access_control_id,
                self.info.entrance_id,
            )
            .await;

        match result {
            Ok(()) => {
                self.set_state(LockState::Unlocked);
                self.schedule_relock();
            }
            Err(err) => {
                warn!(lock = %self.unique_id(), error = %err, "open failed");
                self.set_state(LockState::Jammed);
            }
        }
        self.state()
    }

    /// The vendor API has no lock action; doors relock on their own.
    pub fn lock(&self) {
        debug!(lock = %self.unique_id(), "lock is not supported by the backend");
    }

    /// Re-fetch this lock's backend state (name, openable flag).
    pub async fn update(&mut self) -> Result<(), CoreError> {
        self.info = self
            .coordinator
            .update_lock_state(
                self.info.place_id,
                self.info.access_control_id,
                self.info.entrance_id,
            )
            .await?;
        Ok(())
    }

    /// Cancel a pending relock transition, leaving the current state.
    pub fn cancel_relock(&mut self) {
        if let Some(timer) = self.relock.take() {
            timer.token.cancel();
            timer.handle.abort();
        }
    }

    fn set_state(&self, state: LockState) {
        *self.state.lock().expect("state lock poisoned") = state;
    }

    fn schedule_relock(&mut self) {
        self.cancel_relock();

        let token = CancellationToken::new();
        let task_token = token.clone();
        let state = Arc::clone(&self.state);
        let delay = self.relock_delay;

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = task_token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    *state.lock().expect("state lock poisoned") = LockState::Locked;
                }
            }
        });

        self.relock = Some(RelockTimer { token, handle });
    }
}

impl Drop for LockEntity {
    fn drop(&mut self) {
        self.cancel_relock();
    }
}
