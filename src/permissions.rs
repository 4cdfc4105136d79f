use std::sync::{Arc, Mutex};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// The OS's current decision about one sensor authority. Location reports
/// the full set; the camera subsystem only ever produces
/// `AuthorizedAlways` or `Denied`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationState {
    Undetermined,
    Denied,
    Restricted,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationState {
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationState::AuthorizedWhenInUse | AuthorizationState::AuthorizedAlways
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self != AuthorizationState::Undetermined
    }
}

/// Boundary to the OS authorization subsystem. Status changes re-enter the
/// gate through [`PermissionGate::authorization_changed`].
pub trait AuthorizationBackend: Send + Sync {
    fn current_status(&self) -> AuthorizationState;
    fn request_authorization(&self);
}

struct GateInner {
    // Single-slot replay cache: the last published state plus the live
    // subscriber channels. Kept explicit rather than leaning on a broadcast
    // channel so the replay contract stays visible.
    last: Option<AuthorizationState>,
    subscribers: Vec<mpsc::UnboundedSender<AuthorizationState>>,
}

/// Wraps one OS authorization subsystem behind a pull/push interface.
/// Created once per process and shared via `Arc`; observers only ever see
/// terminal states — an undetermined callback re-issues the request instead
/// of being published.
pub struct PermissionGate {
    backend: Arc<dyn AuthorizationBackend>,
    inner: Mutex<GateInner>,
}

impl PermissionGate {
    pub fn new(backend: Arc<dyn AuthorizationBackend>) -> Arc<Self> {
        let gate = Arc::new(Self {
            backend,
            inner: Mutex::new(GateInner {
                last: None,
                subscribers: Vec::new(),
            }),
        });

        // Seed from the synchronous status query so a gate created after the
        // user already answered the prompt starts resolved.
        let initial = gate.backend.current_status();
        gate.authorization_changed(initial);

        gate
    }

    /// The last known state, absent until the OS has resolved once.
    pub fn current_state(&self) -> Option<AuthorizationState> {
        self.inner.lock().unwrap().last
    }

    /// Replay-capable subscription: the receiver immediately holds the most
    /// recently published state (if any), then every subsequent change.
    pub fn observe(&self) -> mpsc::UnboundedReceiver<AuthorizationState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap();
        if let Some(state) = inner.last {
            let _ = tx.send(state);
        }
        inner.subscribers.push(tx);
        rx
    }

    /// Triggers the OS prompt. No-op once a terminal state has been cached:
    /// re-asking after a denial makes no progress at the OS boundary.
    pub fn request_authorization(&self) {
        if self.current_state().is_some() {
            debug!("Authorization already resolved; skipping request");
            return;
        }
        self.backend.request_authorization();
    }

    /// OS-callback bridge. Normalized to a single entry point so delivery is
    /// serialized on the gate's lock regardless of which thread the OS used.
    pub fn authorization_changed(&self, state: AuthorizationState) {
        if !state.is_terminal() {
            // Never published: downstream code should not have to branch on
            // "not yet asked". Re-issue the request and wait for a terminal
            // callback.
            debug!("Authorization undetermined; re-requesting");
            self.backend.request_authorization();
            return;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.last == Some(state) {
            return;
        }
        info!("Authorization changed: {state:?}");
        inner.last = Some(state);
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(state).is_ok());
    }
}
