//! Process entry point.
//!
//! # Responsibilities
//! - Wire settings, logging, components and the HTTP server together
//! - Short-circuit on init failure before any task starts
//! - Block until every task has exited, or the post-shutdown grace elapses
//! - Map the run into an [`Outcome`] and exit code
//!
//! # Design Decisions
//! - The whole run happens on a spawned task, so a panic anywhere in the
//!   supervisor surfaces as a `JoinError` instead of unwinding through `main`
//! - Tasks still running after the grace period are abandoned, not aborted

use std::any::Any;
use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Dispatch;

use crate::component::{Component, ComponentRegistry, Resources};
use crate::config::validation::validate_settings;
use crate::config::Settings;
use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::health::HealthRoutes;
use crate::http::{HttpServer, ServerControl};
use crate::lifecycle::errors::panic_message;
use crate::lifecycle::orchestrator::spawn_supervised;
use crate::lifecycle::{
    init_all, start_all, DrainFlag, ErrorSet, Injections, ShutdownCoordinator, ShutdownHandle,
    ShutdownState, TerminationSignals,
};
use crate::observability::{logging, Tracer};

const SERVICE_NAME: &str = "steward";

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// Every component stopped without error.
    Clean,
    /// Start-up failed; nothing was started.
    InitFailed(Error),
    /// The run completed but errors were collected along the way.
    Failed(Error),
    /// A panic was caught.
    Fault(String),
}

impl Outcome {
    pub fn code(&self) -> u8 {
        match self {
            Outcome::Clean => 0,
            Outcome::InitFailed(_) | Outcome::Fault(_) => 1,
            Outcome::Failed(_) => 2,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Outcome::Clean)
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Outcome::InitFailed(err) | Outcome::Failed(err) => Some(err),
            Outcome::Clean | Outcome::Fault(_) => None,
        }
    }
}

/// Collects everything a [`Supervisor`] needs that cannot come from settings.
pub struct SupervisorBuilder {
    settings: Settings,
    dispatch: Option<Dispatch>,
    tracer: Option<Tracer>,
    resources: Resources,
    routes: HealthRoutes,
    registry: ComponentRegistry,
}

impl SupervisorBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            dispatch: None,
            tracer: None,
            resources: Resources::new(),
            routes: HealthRoutes::default(),
            registry: ComponentRegistry::new(),
        }
    }

    /// Use a pre-built log sink instead of the default subscriber.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Share a resource with every component that uses resources.
    pub fn with_resource<T: Any + Send + Sync>(mut self, resource: T) -> Self {
        self.resources.insert(resource);
        self
    }

    pub fn with_health_routes(mut self, routes: HealthRoutes) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_component<C: Component>(mut self, component: C) -> Self {
        self.registry.register(component);
        self
    }

    /// Validate settings and install logging.
    pub fn build(self) -> Result<Supervisor> {
        validate_settings(&self.settings).map_err(Error::Config)?;

        // The tracer binds to whatever dispatcher is current, so logging
        // must be installed first.
        let dispatch = match self.dispatch {
            Some(dispatch) => {
                if !logging::install(dispatch.clone()) {
                    tracing::debug!("Global log sink already installed, keeping it");
                }
                Some(dispatch)
            }
            None => {
                logging::init(&self.settings.logging);
                None
            }
        };
        let tracer = match (self.tracer, dispatch) {
            (Some(tracer), _) => tracer,
            (None, Some(dispatch)) => Tracer::with_dispatch(SERVICE_NAME, dispatch),
            (None, None) => Tracer::new(SERVICE_NAME),
        };

        let root = CancellationToken::new();
        let draining = DrainFlag::new();
        let coordinator =
            ShutdownCoordinator::new(self.settings.shutdown.clone(), root.clone(), draining.clone());

        Ok(Supervisor {
            settings: self.settings,
            registry: self.registry,
            routes: self.routes,
            injections: Injections {
                tracer,
                resources: self.resources,
            },
            root,
            draining,
            coordinator,
        })
    }
}

/// Owns the components and the HTTP server for one run.
pub struct Supervisor {
    settings: Settings,
    registry: ComponentRegistry,
    routes: HealthRoutes,
    injections: Injections,
    root: CancellationToken,
    draining: DrainFlag,
    coordinator: ShutdownCoordinator,
}

impl Supervisor {
    /// Handle for observing draining or requesting shutdown from outside.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.coordinator.handle()
    }

    /// Run until shut down. Never panics.
    pub async fn run(self) -> Outcome {
        match tokio::spawn(self.run_inner()).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                let message = panic_message(e.into_panic());
                tracing::error!(panic = %message, "Supervisor panicked");
                Outcome::Fault(message)
            }
            Err(e) => Outcome::Fault(e.to_string()),
        }
    }

    async fn run_inner(self) -> Outcome {
        let Supervisor {
            settings,
            mut registry,
            routes,
            injections,
            root,
            draining,
            coordinator,
        } = self;

        let abandon_after = settings.shutdown.abandon_after();
        let ctx = Arc::new(AppContext::new(settings, draining));
        tracing::info!(
            components = registry.len(),
            address = %ctx.settings().http.bind_address(),
            "Starting application"
        );

        let init = init_all(&mut registry, &injections, &root).await;
        let components = registry.into_shared();
        let server = HttpServer::init(&ctx, routes, Arc::clone(&components));

        let server = match (init, server) {
            (Ok(()), Ok(server)) => server,
            (Err(err), Ok(_)) | (Ok(()), Err(err)) => return init_failed(err),
            (Err(init), Err(http)) => return init_failed(init.and(http)),
        };

        let tracker = TaskTracker::new();
        let errors = ErrorSet::new();

        let signals = match TerminationSignals::install() {
            Ok(signals) => Some(signals),
            Err(e) => {
                tracing::warn!(error = %e, "Signal handlers unavailable, relying on programmatic shutdown");
                errors.push(Error::Signal(e));
                None
            }
        };

        let control = ServerControl::new();
        let handle = coordinator.handle();
        spawn_supervised(
            &tracker,
            "shutdown coordinator".to_string(),
            errors.clone(),
            coordinator.run(signals, control.clone(), Arc::clone(&components), errors.clone()),
        );
        start_all(&components, &root, &tracker, &errors);
        server.start(control, &tracker, errors.clone(), root.clone());
        tracker.close();

        tracing::info!(started_at = %ctx.started_at(), "Application started");

        tokio::select! {
            _ = tracker.wait() => {}
            _ = async {
                handle.wait_for(ShutdownState::Stopped).await;
                tokio::time::sleep(abandon_after).await;
            } => {
                tracing::warn!(
                    remaining = tracker.len(),
                    grace = ?abandon_after,
                    "Abandoning tasks still running after shutdown"
                );
            }
        }

        match errors.into_result() {
            Ok(()) => {
                tracing::info!("Application stopped");
                Outcome::Clean
            }
            Err(err) if err.any(&|e| matches!(e, Error::Panicked { .. })) => {
                tracing::error!(error = %err, "Application stopped after a panic");
                Outcome::Fault(err.to_string())
            }
            Err(err) => {
                tracing::error!(error = %err, "Application stopped with errors");
                Outcome::Failed(err)
            }
        }
    }
}

fn init_failed(err: Error) -> Outcome {
    tracing::error!(error = %err, "Initialising application failed");
    Outcome::InitFailed(err)
}
