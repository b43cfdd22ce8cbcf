//! Hub service — the caller-facing entry point: register devices, run programs.

use std::sync::Arc;

use devhub_domain::error::DispatchError;
use devhub_domain::id::DeviceId;
use devhub_domain::program::Program;
use devhub_domain::report::ProgramReport;

use crate::dispatcher::Dispatcher;
use crate::ports::Device;
use crate::registry::{DeviceRegistry, RegisteredDevice};

use super::program_runner::ProgramRunner;

/// Facade over the registry and the program runner.
///
/// Cheap to clone: clones share the same registry, so registration may be
/// issued from several tasks at once.
#[derive(Clone)]
pub struct HubService {
    registry: Arc<DeviceRegistry>,
    runner: ProgramRunner,
}

impl Default for HubService {
    fn default() -> Self {
        Self::new(Arc::new(DeviceRegistry::new()))
    }
}

impl HubService {
    /// Create a service backed by the given registry.
    pub fn new(registry: Arc<DeviceRegistry>) -> Self {
        let runner = ProgramRunner::new(Dispatcher::new(Arc::clone(&registry)));
        Self { registry, runner }
    }

    /// Register a device and return its identifier.
    pub fn register(&self, device: impl Device + 'static) -> DeviceId {
        self.registry.register(device)
    }

    /// Look up a registered device.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownDevice`] for an identifier that was
    /// never registered.
    pub fn resolve(&self, id: DeviceId) -> Result<Arc<RegisteredDevice>, DispatchError> {
        self.registry.resolve(id)
    }

    /// Run a program with its declared discipline.
    ///
    /// # Errors
    ///
    /// See [`ProgramRunner::run_program`].
    pub async fn run_program(&self, program: Program) -> Result<ProgramReport, DispatchError> {
        self.runner.run_program(program).await
    }

    /// The registry shared by every clone of this service.
    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }
}
