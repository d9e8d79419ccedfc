use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_FIX_TIMEOUT_MS: u64 = 8_000;
pub const MIN_FIX_TIMEOUT_MS: u64 = 1_000;
pub const MAX_FIX_TIMEOUT_MS: u64 = 60_000;

/// Options for a position request. Defaults match the search flow's
/// needs: high accuracy, ~8s timeout, and no cached fix accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_age_ms: u64,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: DEFAULT_FIX_TIMEOUT_MS,
            max_age_ms: 0,
        }
    }
}

impl FixOptions {
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn low_accuracy(mut self) -> Self {
        self.high_accuracy = false;
        self
    }

    #[must_use]
    pub fn validated(mut self) -> Self {
        self.timeout_ms = self.timeout_ms.clamp(MIN_FIX_TIMEOUT_MS, MAX_FIX_TIMEOUT_MS);
        self
    }
}

/// Identifies a continuous watch so the shell can tear it down again.
/// Leaking a watch keeps the device GPS hot for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeolocationOperation {
    GetFix { options: FixOptions },
    Watch { id: WatchId, options: FixOptions },
    ClearWatch { id: WatchId },
}

impl Operation for GeolocationOperation {
    type Output = GeolocationResult;
}

/// One position update as delivered by the device, `{latitude, longitude}`
/// plus whatever accuracy estimate the platform offers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeolocationOutput {
    Position(PositionFix),
    WatchCleared,
}

impl GeolocationOutput {
    #[must_use]
    pub fn into_position(self) -> Option<PositionFix> {
        match self {
            Self::Position(fix) => Some(fix),
            Self::WatchCleared => None,
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("no fix within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("geolocation not supported on this device")]
    Unsupported,

    #[error("location unavailable: {reason}")]
    Unavailable { reason: String },
}

impl GeolocationError {
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable { .. })
    }
}

pub type GeolocationResult = Result<GeolocationOutput, GeolocationError>;

/// Wraps the device location API. `get_fix` is one-shot; `watch` streams
/// updates until `clear_watch` is issued for the same id.
pub struct Geolocation<Ev> {
    context: CapabilityContext<GeolocationOperation, Ev>,
}

impl<Ev> Capability<Ev> for Geolocation<Ev> {
    type Operation = GeolocationOperation;
    type MappedSelf<MappedEv> = Geolocation<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Geolocation::new(self.context.map_event(f))
    }
}

impl<Ev> Geolocation<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<GeolocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn get_fix<F>(&self, options: FixOptions, make_event: F)
    where
        F: FnOnce(GeolocationResult) -> Ev + Send + 'static,
    {
        let options = options.validated();
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(GeolocationOperation::GetFix { options })
                .await;
            context.update_app(make_event(result));
        });
    }

    /// Each delivery produces one event. The subscription stays alive
    /// until `clear_watch(id)`; callers own that teardown.
    pub fn watch<F>(&self, id: WatchId, options: FixOptions, make_event: F)
    where
        F: Fn(GeolocationResult) -> Ev + Send + 'static,
    {
        let options = options.validated();
        let context = self.context.clone();
        self.context.spawn(async move {
            let updates = context.stream_from_shell(GeolocationOperation::Watch { id, options });
            futures::pin_mut!(updates);

            while let Some(result) = updates.next().await {
                let cleared = matches!(result, Ok(GeolocationOutput::WatchCleared));
                context.update_app(make_event(result));
                if cleared {
                    break;
                }
            }
        });
    }

    pub fn clear_watch(&self, id: WatchId) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context
                .notify_shell(GeolocationOperation::ClearWatch { id })
                .await;
        });
    }
}
