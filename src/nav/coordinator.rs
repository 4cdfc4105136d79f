use tokio::sync::mpsc;
use uuid::Uuid;

pub type CoordinatorId = Uuid;

/// Shared render target handed down the coordinator tree. The actual screen
/// rendering lives outside this crate.
pub trait ScreenHost: Send + Sync {
    fn present(&self, screen: &str);
}

/// Completion notifications flowing up the tree. Processed one at a time by
/// the owning coordinator's event loop, so no two children's completions
/// interleave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    ChildDidStop(CoordinatorId),
}

/// Non-owning back-reference a child uses to report completion upward. Holds
/// only a channel sender, never the parent's state, so the parent's release
/// of a completed child is the sole deallocation trigger.
#[derive(Clone)]
pub struct FlowReporter {
    id: CoordinatorId,
    events: mpsc::UnboundedSender<FlowEvent>,
}

impl FlowReporter {
    pub fn new(id: CoordinatorId, events: mpsc::UnboundedSender<FlowEvent>) -> Self {
        Self { id, events }
    }

    pub fn id(&self) -> CoordinatorId {
        self.id
    }

    /// Signals the owner that this flow is done. Delivery failure means the
    /// owner is already gone, which is fine during shutdown.
    pub fn report_stopped(&self) {
        let _ = self.events.send(FlowEvent::ChildDidStop(self.id));
    }
}

/// One node in the navigation state machine: a screen flow that can be
/// activated on the shared host.
pub trait Coordinator: Send {
    fn id(&self) -> CoordinatorId;
    fn start(&mut self);
}
