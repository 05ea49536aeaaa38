use crate::runtime_state::StorageMode;
use crate::storage::LocalStorage;

/// How a platform facility behaves when page script reaches for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Available,
    Missing,
    /// Touching the facility raises, as `window.localStorage` does in
    /// sandboxed frames and opaque origins.
    Throws,
}

impl Availability {
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Missing => "missing",
            Self::Throws => "throws",
        }
    }
}

/// The facilities a context offers for durable dialog state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformCapabilities {
    pub local_storage: Availability,
    pub json: Availability,
}

impl PlatformCapabilities {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn without_local_storage() -> Self {
        Self {
            local_storage: Availability::Missing,
            json: Availability::Available,
        }
    }

    pub fn with_local_storage(mut self, availability: Availability) -> Self {
        self.local_storage = availability;
        self
    }

    pub fn with_json(mut self, availability: Availability) -> Self {
        self.json = availability;
        self
    }
}

/// Proof that a context can serialize values into its origin's localStorage.
#[derive(Debug, Clone)]
pub(crate) struct DurableCapability {
    storage: LocalStorage,
}

impl DurableCapability {
    pub(crate) fn into_storage(self) -> LocalStorage {
        self.storage
    }
}

pub(crate) fn try_detect(
    capabilities: PlatformCapabilities,
    storage: &LocalStorage,
) -> Option<DurableCapability> {
    if capabilities.local_storage.is_available() && capabilities.json.is_available() {
        Some(DurableCapability {
            storage: storage.clone(),
        })
    } else {
        None
    }
}

pub(crate) fn probe(capabilities: PlatformCapabilities, storage: &LocalStorage) -> StorageMode {
    match try_detect(capabilities, storage) {
        Some(_) => StorageMode::Durable,
        None => StorageMode::Volatile,
    }
}

/// Trace text for a volatile decision; `None` when both checks pass.
pub(crate) fn unavailable_reason(capabilities: PlatformCapabilities) -> Option<String> {
    let mut reasons = Vec::new();
    if !capabilities.local_storage.is_available() {
        reasons.push(format!("localStorage {}", capabilities.local_storage.as_str()));
    }
    if !capabilities.json.is_available() {
        reasons.push(format!("JSON {}", capabilities.json.as_str()));
    }
    if reasons.is_empty() {
        None
    } else {
        Some(reasons.join(", "))
    }
}
