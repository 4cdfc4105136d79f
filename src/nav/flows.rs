use std::{sync::Arc, time::Duration};

use log::info;

use crate::tools::{self, ToolItem};

use super::coordinator::{Coordinator, CoordinatorId, FlowReporter, ScreenHost};

/// Branding screen shown at launch. With `auto_advance` set it reports
/// completion on its own after the delay; otherwise an external driver calls
/// through the reporter.
pub struct SplashCoordinator {
    id: CoordinatorId,
    host: Arc<dyn ScreenHost>,
    reporter: FlowReporter,
    auto_advance: Option<Duration>,
}

impl SplashCoordinator {
    pub fn new(
        host: Arc<dyn ScreenHost>,
        reporter: FlowReporter,
        auto_advance: Option<Duration>,
    ) -> Self {
        Self {
            id: reporter.id(),
            host,
            reporter,
            auto_advance,
        }
    }
}

impl Coordinator for SplashCoordinator {
    fn id(&self) -> CoordinatorId {
        self.id
    }

    fn start(&mut self) {
        self.host.present("splash");
        if let Some(delay) = self.auto_advance {
            let reporter = self.reporter.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                reporter.report_stopped();
            });
        }
    }
}

/// First-run walkthrough. Completion comes from the user paging through it;
/// the reporter is exposed so the UI layer can deliver that.
pub struct IntroCoordinator {
    id: CoordinatorId,
    host: Arc<dyn ScreenHost>,
    reporter: FlowReporter,
}

impl IntroCoordinator {
    pub fn new(host: Arc<dyn ScreenHost>, reporter: FlowReporter) -> Self {
        Self {
            id: reporter.id(),
            host,
            reporter,
        }
    }

    pub fn reporter(&self) -> FlowReporter {
        self.reporter.clone()
    }
}

impl Coordinator for IntroCoordinator {
    fn id(&self) -> CoordinatorId {
        self.id
    }

    fn start(&mut self) {
        self.host.present("intro");
    }
}

/// The main screen: tool catalog plus scan history. Lives for the rest of
/// the process once routed to.
pub struct HomeCoordinator {
    id: CoordinatorId,
    host: Arc<dyn ScreenHost>,
}

impl HomeCoordinator {
    pub fn new(host: Arc<dyn ScreenHost>, id: CoordinatorId) -> Self {
        Self { id, host }
    }

    pub fn catalog(&self) -> &'static [ToolItem] {
        tools::catalog()
    }
}

impl Coordinator for HomeCoordinator {
    fn id(&self) -> CoordinatorId {
        self.id
    }

    fn start(&mut self) {
        info!("Home flow active with {} tools", self.catalog().len());
        self.host.present("home");
    }
}
