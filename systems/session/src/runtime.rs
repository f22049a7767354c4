use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use gridlock_core::{PlacementCommit, SessionSummary};
use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::{GameEngine, Session, SessionError, SessionSpec, SessionState};

const TICK: Duration = Duration::from_secs(1);

struct Shared<E> {
    session: Mutex<Session<E>>,
    states: watch::Sender<SessionState>,
}

impl<E: GameEngine> Shared<E> {
    /// The session lock is never held across an await point.
    fn lock(&self) -> MutexGuard<'_, Session<E>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one event against the session and publishes the resulting state.
    fn apply<F>(&self, event: F) -> SessionState
    where
        F: FnOnce(&mut Session<E>) -> SessionState,
    {
        let state = event(&mut self.lock());
        let _ = self.states.send_if_modified(|published| {
            if *published == state {
                return false;
            }
            *published = state.clone();
            true
        });
        state
    }
}

/// Session driven by engine events and a one-second countdown task.
///
/// Placement events and countdown ticks race to finalize the attempt. Both go
/// through the session lock and only a running session accepts them, so the
/// first finalizer wins and later events are dropped. Countdown methods must
/// be called from within a tokio runtime.
pub struct SessionRuntime<E> {
    shared: Arc<Shared<E>>,
    countdown: Option<JoinHandle<()>>,
}

impl<E> SessionRuntime<E>
where
    E: GameEngine + Send + 'static,
{
    /// Creates an idle runtime.
    #[must_use]
    pub fn new(spec: SessionSpec, engine: E) -> Self {
        let (states, _) = watch::channel(SessionState::Idle);
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session::new(spec, engine)),
                states,
            }),
            countdown: None,
        }
    }

    /// Receiver of every published state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.states.subscribe()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.lock().state().clone()
    }

    /// Current counters.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        self.shared.lock().summary().clone()
    }

    /// Runs a closure against the engine, for instance to commit a placement
    /// on the grid before reporting it.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut E) -> R) -> R {
        f(self.shared.lock().engine_mut())
    }

    /// Starts an attempt and its countdown when the rules are timed.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        let mut started = Ok((0, None));
        let _ = self.shared.apply(|session| {
            started = session
                .begin()
                .map(|attempt| (attempt, session.spec().countdown_secs()));
            session.state().clone()
        });
        let (attempt, countdown) = started?;
        self.cancel_countdown();
        if countdown.is_some() {
            self.countdown = Some(self.spawn_countdown(attempt));
        }
        Ok(())
    }

    /// Reports a placement committed by the engine.
    pub fn on_placement(&mut self, commit: PlacementCommit) -> SessionState {
        let state = self
            .shared
            .apply(|session| session.on_placement(commit).clone());
        if state.is_terminal() {
            self.cancel_countdown();
        }
        state
    }

    /// Counts a hold.
    pub fn record_hold(&mut self) {
        self.shared.lock().record_hold();
    }

    /// Counts an undo.
    pub fn record_undo(&mut self) {
        self.shared.lock().record_undo();
    }

    /// Fails the attempt because no remaining piece fits.
    pub fn report_board_locked(&mut self) -> SessionState {
        let state = self
            .shared
            .apply(|session| session.report_board_locked().clone());
        self.cancel_countdown();
        state
    }

    /// Cancels the countdown, then returns the session to idle.
    pub fn conclude_due_to_manual_exit(&mut self) {
        self.cancel_countdown();
        let _ = self.shared.apply(|session| {
            session.conclude_due_to_manual_exit();
            session.state().clone()
        });
    }

    fn spawn_countdown(&self, attempt: u64) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK, TICK);
            loop {
                let _ = ticks.tick().await;
                let mut stale = false;
                let state = shared.apply(|session| {
                    stale = session.attempt() != attempt;
                    session.on_tick(attempt).clone()
                });
                if stale || !state.is_running() {
                    debug!("countdown for attempt {attempt} stopped");
                    break;
                }
            }
        })
    }

    fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}

impl<E> Drop for SessionRuntime<E> {
    fn drop(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }
}
