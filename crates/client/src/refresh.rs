//! Single-flight token refresh.
//!
//! At most one refresh call runs at a time. Callers that arrive while it runs
//! join the pending-waiters list and receive the same outcome. A caller whose
//! token was already replaced gets the newer session without a call.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::error::RefreshError;
use crate::session::{Session, SessionHandle};

/// Exchanges a refresh token for a new session.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<Session, RefreshError>;
}

/// A refreshed session and the generation it was stored under.
pub type Refreshed = (Session, u64);

type Outcome = Result<Refreshed, RefreshError>;

type Waiter = oneshot::Sender<Outcome>;

#[derive(Default)]
struct Flight {
    in_flight: bool,
    waiters: Vec<Waiter>,
}

/// What a caller does after looking at the current state.
enum Step {
    Ready(Refreshed),
    Wait(oneshot::Receiver<Outcome>),
    Lead(String),
    Expired,
}

pub struct RefreshCoordinator {
    session: SessionHandle,
    refresher: Arc<dyn TokenRefresher>,
    flight: Mutex<Flight>,
}

impl RefreshCoordinator {
    pub fn new(session: SessionHandle, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            session,
            refresher,
            flight: Mutex::new(Flight::default()),
        }
    }

    /// Number of callers waiting on the running refresh.
    pub fn pending_waiters(&self) -> usize {
        self.flight.lock().waiters.len()
    }

    /// Returns a session newer than `stale_generation`, with its generation.
    ///
    /// On failure the stored session is cleared and every waiter receives the
    /// same error.
    pub async fn refresh(&self, stale_generation: u64) -> Outcome {
        match self.next_step(stale_generation) {
            Step::Ready(refreshed) => Ok(refreshed),
            Step::Expired => Err(RefreshError::NoSession),
            Step::Wait(rx) => rx.await.unwrap_or(Err(RefreshError::Abandoned)),
            Step::Lead(refresh_token) => {
                let guard = LeaderGuard { coordinator: self };
                let outcome = self.refresher.refresh(&refresh_token).await;
                guard.finish(outcome)
            }
        }
    }

    fn next_step(&self, stale_generation: u64) -> Step {
        let mut flight = self.flight.lock();

        match self.session.current() {
            Some((session, generation)) if generation != stale_generation => {
                Step::Ready((session, generation))
            }
            _ if flight.in_flight => {
                let (tx, rx) = oneshot::channel();
                flight.waiters.push(tx);
                Step::Wait(rx)
            }
            Some((session, _)) => {
                flight.in_flight = true;
                Step::Lead(session.refresh_token)
            }
            None => Step::Expired,
        }
    }

    fn complete(&self, outcome: Result<Session, RefreshError>) -> Outcome {
        let outcome = match outcome {
            Ok(session) => {
                let generation = self.session.replace(session.clone());
                Ok((session, generation))
            }
            Err(e) => {
                tracing::info!(error = %e, "Session refresh failed; signing out");
                self.session.clear();
                Err(e)
            }
        };

        let waiters = {
            let mut flight = self.flight.lock();
            flight.in_flight = false;
            std::mem::take(&mut flight.waiters)
        };
        tracing::debug!(waiters = waiters.len(), ok = outcome.is_ok(), "Refresh completed");

        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
        outcome
    }
}

/// Releases the flight if the leading caller is dropped mid-refresh.
struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
}

impl LeaderGuard<'_> {
    fn finish(self, outcome: Result<Session, RefreshError>) -> Outcome {
        let coordinator = self.coordinator;
        std::mem::forget(self);
        coordinator.complete(outcome)
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        let waiters = {
            let mut flight = self.coordinator.flight.lock();
            flight.in_flight = false;
            std::mem::take(&mut flight.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(Err(RefreshError::Abandoned));
        }
    }
}
