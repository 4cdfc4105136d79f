pub mod coordinator;
pub mod flows;
pub mod root;

pub use coordinator::{Coordinator, CoordinatorId, FlowEvent, FlowReporter, ScreenHost};
pub use root::{ActiveFlow, RootCoordinator};
