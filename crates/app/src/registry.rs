//! Device registry — the sole authority mapping identifiers to devices.
//!
//! Registration is append-only: there is no update or removal, so an
//! identifier handed out once stays valid for the lifetime of the registry.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{Mutex, MutexGuard};

use devhub_domain::error::DispatchError;
use devhub_domain::id::DeviceId;
use devhub_domain::message::Message;
use devhub_domain::reply::DeviceReply;

use crate::ports::Device;

/// A device owned by the registry, together with its identifier.
///
/// Each registered device sits behind a gate so it handles one message at a
/// time, even when two batches target it concurrently.
pub struct RegisteredDevice {
    id: DeviceId,
    gate: Mutex<()>,
    device: Box<dyn Device>,
}

impl RegisteredDevice {
    fn new(id: DeviceId, device: Box<dyn Device>) -> Self {
        Self {
            id,
            gate: Mutex::new(()),
            device,
        }
    }

    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.device.name()
    }

    /// Wait for exclusive access to the device.
    pub async fn acquire(&self) -> DeviceLease<'_> {
        DeviceLease {
            _guard: self.gate.lock().await,
            device: self.device.as_ref(),
        }
    }
}

impl std::fmt::Debug for RegisteredDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredDevice")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Exclusive access to one registered device, released on drop.
pub struct DeviceLease<'a> {
    _guard: MutexGuard<'a, ()>,
    device: &'a dyn Device,
}

impl DeviceLease<'_> {
    /// Hand `message` to the device.
    ///
    /// # Errors
    ///
    /// Propagates the device's error (typically
    /// [`DispatchError::UnsupportedCommand`]).
    pub async fn handle(&self, message: &Message) -> Result<DeviceReply, DispatchError> {
        self.device.handle(message).await
    }
}

/// Thread-safe, append-only map from [`DeviceId`] to device.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: RwLock<HashMap<DeviceId, Arc<RegisteredDevice>>>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `device` and return its freshly assigned identifier.
    ///
    /// Safe to call from several threads at once: every call yields a
    /// distinct identifier and no registration is lost.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name()))]
    pub fn register(&self, device: impl Device + 'static) -> DeviceId {
        let mut devices = self
            .devices
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut id = DeviceId::new();
        while devices.contains_key(&id) {
            id = DeviceId::new();
        }

        devices.insert(id, Arc::new(RegisteredDevice::new(id, Box::new(device))));
        tracing::debug!(%id, total = devices.len(), "device registered");
        id
    }

    /// Look up the device registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownDevice`] when `id` was never returned by
    /// [`register`](Self::register).
    pub fn resolve(&self, id: DeviceId) -> Result<Arc<RegisteredDevice>, DispatchError> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(DispatchError::UnknownDevice(id))
    }

    /// Identifiers of every registered device, in no particular order.
    #[must_use]
    pub fn ids(&self) -> Vec<DeviceId> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
