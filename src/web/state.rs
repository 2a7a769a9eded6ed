//! Shared handler state.

use crate::tracker::{
    ports::{SessionStore, TrackerStore},
    services::{
        AuthService, DashboardService, PositionService, TaskService, TaskTypeService,
        WorkerService,
    },
};
use chrono::Duration;
use mockable::DefaultClock;
use std::sync::Arc;

type Store = dyn TrackerStore;
type Sessions = dyn SessionStore;

struct Services {
    auth: AuthService<Store, Sessions, DefaultClock>,
    dashboard: DashboardService<Store, Sessions>,
    tasks: TaskService<Store, DefaultClock>,
    workers: WorkerService<Store>,
    positions: PositionService<Store>,
    task_types: TaskTypeService<Store>,
}

/// Services shared by every request, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    services: Arc<Services>,
}

impl AppState {
    /// Wires the tracker services over the given stores.
    #[must_use]
    pub fn new(store: Arc<Store>, sessions: Arc<Sessions>, session_ttl: Duration) -> Self {
        let clock = Arc::new(DefaultClock);
        let services = Services {
            auth: AuthService::new(
                Arc::clone(&store),
                Arc::clone(&sessions),
                Arc::clone(&clock),
                session_ttl,
            ),
            dashboard: DashboardService::new(Arc::clone(&store), sessions),
            tasks: TaskService::new(Arc::clone(&store), clock),
            workers: WorkerService::new(Arc::clone(&store)),
            positions: PositionService::new(Arc::clone(&store)),
            task_types: TaskTypeService::new(store),
        };
        Self {
            services: Arc::new(services),
        }
    }

    pub(crate) fn auth(&self) -> &AuthService<Store, Sessions, DefaultClock> {
        &self.services.auth
    }

    pub(crate) fn dashboard(&self) -> &DashboardService<Store, Sessions> {
        &self.services.dashboard
    }

    pub(crate) fn tasks(&self) -> &TaskService<Store, DefaultClock> {
        &self.services.tasks
    }

    pub(crate) fn workers(&self) -> &WorkerService<Store> {
        &self.services.workers
    }

    pub(crate) fn positions(&self) -> &PositionService<Store> {
        &self.services.positions
    }

    pub(crate) fn task_types(&self) -> &TaskTypeService<Store> {
        &self.services.task_types
    }
}
