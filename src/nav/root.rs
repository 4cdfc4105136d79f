use std::{collections::HashMap, sync::Arc, time::Duration};

use log::{error, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::flags::{FlagStore, DID_SHOW_INTRO};

use super::{
    coordinator::{Coordinator, CoordinatorId, FlowEvent, FlowReporter, ScreenHost},
    flows::{HomeCoordinator, IntroCoordinator, SplashCoordinator},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFlow {
    Splash,
    Intro,
    Home,
}

/// Root of the coordinator tree. Owns the child flow coordinators, drains
/// their completion events one at a time, and decides routing: splash first,
/// then intro on the first run (per the persisted `didShowIntro` flag), then
/// home. Created once at process start and never stopped.
pub struct RootCoordinator {
    host: Arc<dyn ScreenHost>,
    flags: Arc<dyn FlagStore>,
    events_tx: mpsc::UnboundedSender<FlowEvent>,
    children: HashMap<CoordinatorId, Box<dyn Coordinator>>,
    splash_id: Option<CoordinatorId>,
    intro_id: Option<CoordinatorId>,
    home_id: Option<CoordinatorId>,
    splash_auto_advance: Option<Duration>,
}

impl RootCoordinator {
    pub fn new(
        host: Arc<dyn ScreenHost>,
        flags: Arc<dyn FlagStore>,
        splash_auto_advance: Option<Duration>,
    ) -> (Self, mpsc::UnboundedReceiver<FlowEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (
            Self {
                host,
                flags,
                events_tx,
                children: HashMap::new(),
                splash_id: None,
                intro_id: None,
                home_id: None,
                splash_auto_advance,
            },
            events_rx,
        )
    }

    pub fn start(&mut self) {
        self.route_to_splash();
    }

    /// Drains child completions serially until the process shuts down.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<FlowEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::ChildDidStop(id) => self.child_did_stop(id),
        }
    }

    pub fn active_flow(&self) -> Option<ActiveFlow> {
        if self.home_id.is_some() {
            Some(ActiveFlow::Home)
        } else if self.intro_id.is_some() {
            Some(ActiveFlow::Intro)
        } else if self.splash_id.is_some() {
            Some(ActiveFlow::Splash)
        } else {
            None
        }
    }

    pub fn active_child_id(&self) -> Option<CoordinatorId> {
        self.home_id.or(self.intro_id).or(self.splash_id)
    }

    /// The single extension point a completion reaches. The owning reference
    /// is removed before any routing decision, so exactly one top-level flow
    /// stays active. A completion for a child we no longer own is a
    /// programming error (a flow reporting twice, or a stale reference after
    /// home); removal is idempotent, so it is logged and ignored.
    fn child_did_stop(&mut self, id: CoordinatorId) {
        if self.children.remove(&id).is_none() {
            warn!("Ignoring completion from unowned child {id}");
            return;
        }

        if self.splash_id == Some(id) {
            self.splash_id = None;
            if self.flags.get(DID_SHOW_INTRO) {
                self.route_to_home();
            } else {
                self.route_to_intro();
            }
        } else if self.intro_id == Some(id) {
            self.intro_id = None;
            if let Err(err) = self.flags.set(DID_SHOW_INTRO, true) {
                error!("Failed to persist intro flag: {err:#}");
            }
            self.route_to_home();
        } else {
            // Home has no successor; it never stops during normal operation.
            warn!("Unexpected completion from flow {id}");
        }
    }

    fn add_child(&mut self, child: Box<dyn Coordinator>) -> CoordinatorId {
        let id = child.id();
        self.children.insert(id, child);
        id
    }

    fn reporter(&self) -> FlowReporter {
        FlowReporter::new(Uuid::new_v4(), self.events_tx.clone())
    }

    fn route_to_splash(&mut self) {
        info!("Routing to splash");
        let splash = SplashCoordinator::new(
            self.host.clone(),
            self.reporter(),
            self.splash_auto_advance,
        );
        let id = self.add_child(Box::new(splash));
        self.splash_id = Some(id);
        self.start_child(id);
    }

    fn route_to_intro(&mut self) {
        info!("Routing to intro (first run)");
        let intro = IntroCoordinator::new(self.host.clone(), self.reporter());
        let id = self.add_child(Box::new(intro));
        self.intro_id = Some(id);
        self.start_child(id);
    }

    fn route_to_home(&mut self) {
        info!("Routing to home");
        let home = HomeCoordinator::new(self.host.clone(), Uuid::new_v4());
        let id = self.add_child(Box::new(home));
        self.home_id = Some(id);
        self.start_child(id);
    }

    fn start_child(&mut self, id: CoordinatorId) {
        if let Some(child) = self.children.get_mut(&id) {
            child.start();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::MemoryFlagStore;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingHost {
        screens: StdMutex<Vec<String>>,
    }

    impl RecordingHost {
        fn shown(&self) -> Vec<String> {
            self.screens.lock().unwrap().clone()
        }
    }

    impl ScreenHost for RecordingHost {
        fn present(&self, screen: &str) {
            self.screens.lock().unwrap().push(screen.to_string());
        }
    }

    fn root_with_flag(intro_shown: bool) -> (RootCoordinator, Arc<RecordingHost>) {
        let host = Arc::new(RecordingHost::default());
        let flags = Arc::new(MemoryFlagStore::with(DID_SHOW_INTRO, intro_shown));
        let (root, _events) = RootCoordinator::new(host.clone(), flags, None);
        (root, host)
    }

    fn complete_active(root: &mut RootCoordinator) -> CoordinatorId {
        let id = root.active_child_id().expect("a flow is active");
        root.handle_event(FlowEvent::ChildDidStop(id));
        id
    }

    #[test]
    fn first_run_goes_splash_intro_home() {
        let (mut root, host) = root_with_flag(false);
        root.start();
        assert_eq!(root.active_flow(), Some(ActiveFlow::Splash));

        complete_active(&mut root);
        assert_eq!(root.active_flow(), Some(ActiveFlow::Intro));

        complete_active(&mut root);
        assert_eq!(root.active_flow(), Some(ActiveFlow::Home));

        assert_eq!(host.shown(), vec!["splash", "intro", "home"]);
    }

    #[test]
    fn subsequent_run_skips_intro() {
        let (mut root, host) = root_with_flag(true);
        root.start();
        complete_active(&mut root);

        assert_eq!(root.active_flow(), Some(ActiveFlow::Home));
        assert_eq!(host.shown(), vec!["splash", "home"]);
    }

    #[test]
    fn intro_completion_persists_the_flag() {
        let host = Arc::new(RecordingHost::default());
        let flags = Arc::new(MemoryFlagStore::new());
        let (mut root, _events) = RootCoordinator::new(host, flags.clone(), None);

        root.start();
        complete_active(&mut root); // splash -> intro
        complete_active(&mut root); // intro -> home

        assert!(flags.get(DID_SHOW_INTRO));
    }

    #[test]
    fn stale_completions_after_home_do_not_reroute() {
        let (mut root, host) = root_with_flag(false);
        root.start();

        let splash_id = complete_active(&mut root);
        let intro_id = complete_active(&mut root);
        assert_eq!(root.active_flow(), Some(ActiveFlow::Home));

        // Stale references firing again must be ignored.
        root.handle_event(FlowEvent::ChildDidStop(splash_id));
        root.handle_event(FlowEvent::ChildDidStop(intro_id));

        assert_eq!(root.active_flow(), Some(ActiveFlow::Home));
        assert_eq!(host.shown(), vec!["splash", "intro", "home"]);
    }

    #[test]
    fn exactly_one_flow_is_active_at_a_time() {
        let (mut root, _host) = root_with_flag(false);
        root.start();
        assert_eq!(root.children.len(), 1);

        complete_active(&mut root);
        assert_eq!(root.children.len(), 1);

        complete_active(&mut root);
        assert_eq!(root.children.len(), 1);
    }
}
