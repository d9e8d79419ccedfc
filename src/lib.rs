#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use app::App;
pub use capabilities::{Capabilities, Effect};

pub const DEFAULT_ORIGIN_LAT: f64 = 53.54;
pub const DEFAULT_ORIGIN_LNG: f64 = 10.0;
pub const LOCATION_FIX_TIMEOUT_MS: u64 = 8_000;
pub const NEARBY_QUERY_TIMEOUT_MS: u64 = 15_000;
pub const TICKETS_TIMEOUT_MS: u64 = 15_000;
pub const CAMERA_DETAIL_TIMEOUT_MS: u64 = 15_000;
pub const STATUS_UPDATE_TIMEOUT_MS: u64 = 15_000;
pub const NOTIFICATION_DURATION_MS: u64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    NotFound,
    Validation,
    Deserialization,
    Location,
    LocationPermissionDenied,
    LocationUnsupported,
    Internal,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::Location => "LOCATION_ERROR",
            Self::LocationPermissionDenied => "LOCATION_PERMISSION_DENIED",
            Self::LocationUnsupported => "LOCATION_UNSUPPORTED",
            Self::Internal => "INTERNAL_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::Location)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your connection and try again.".into()
            }
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::NotFound => "The requested item could not be found.".into(),
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Deserialization => {
                "The server sent an unexpected response. Please try again.".into()
            }
            ErrorKind::Location => {
                "Unable to determine your location. Showing the default area instead.".into()
            }
            ErrorKind::LocationPermissionDenied => {
                "Location access is disabled. Showing the default area instead.".into()
            }
            ErrorKind::LocationUnsupported => {
                "This device does not provide location. Showing the default area instead.".into()
            }
            ErrorKind::Internal | ErrorKind::Unknown => {
                "An unexpected error occurred. Please try again.".into()
            }
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let kind = match status {
            400 => ErrorKind::Validation,
            404 => ErrorKind::NotFound,
            408 => ErrorKind::Timeout,
            500..=599 => ErrorKind::Internal,
            _ => ErrorKind::Unknown,
        };

        let message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP error: {status}"));

        Self::new(kind, message)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
}

impl From<CoordinateError> for AppError {
    fn from(e: CoordinateError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatedCoordinate {
    lat: f64,
    lng: f64,
}

impl ValidatedCoordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(self) -> f64 {
        self.lng
    }
}

impl TryFrom<(f64, f64)> for ValidatedCoordinate {
    type Error = CoordinateError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginProvenance {
    Device,
    DroppedPin,
    DefaultFallback,
}

impl OriginProvenance {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Device => "Your current location",
            Self::DroppedPin => "Dropped pin",
            Self::DefaultFallback => "Default search origin",
        }
    }
}

/// The one authoritative point proximity queries are issued from.
/// Replaced wholesale on every fix or map click, never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    coordinate: ValidatedCoordinate,
    provenance: OriginProvenance,
}

impl Origin {
    #[must_use]
    pub const fn device(coordinate: ValidatedCoordinate) -> Self {
        Self {
            coordinate,
            provenance: OriginProvenance::Device,
        }
    }

    #[must_use]
    pub const fn dropped_pin(coordinate: ValidatedCoordinate) -> Self {
        Self {
            coordinate,
            provenance: OriginProvenance::DroppedPin,
        }
    }

    #[must_use]
    pub const fn default_fallback() -> Self {
        Self {
            coordinate: ValidatedCoordinate {
                lat: DEFAULT_ORIGIN_LAT,
                lng: DEFAULT_ORIGIN_LNG,
            },
            provenance: OriginProvenance::DefaultFallback,
        }
    }

    #[must_use]
    pub const fn coordinate(self) -> ValidatedCoordinate {
        self.coordinate
    }

    #[must_use]
    pub const fn provenance(self) -> OriginProvenance {
        self.provenance
    }

    #[must_use]
    pub const fn is_pin(self) -> bool {
        matches!(self.provenance, OriginProvenance::DroppedPin)
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::default_fallback()
    }
}

/// Search radius, restricted to the values the radius picker offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchRadius {
    M500,
    #[default]
    M1000,
    M2000,
    M5000,
}

impl SearchRadius {
    pub const ALL: [Self; 4] = [Self::M500, Self::M1000, Self::M2000, Self::M5000];

    #[must_use]
    pub const fn meters(self) -> u32 {
        match self {
            Self::M500 => 500,
            Self::M1000 => 1000,
            Self::M2000 => 2000,
            Self::M5000 => 5000,
        }
    }

    #[must_use]
    pub fn from_meters(meters: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.meters() == meters)
    }

    #[must_use]
    pub const fn zoom(self) -> f64 {
        match self {
            Self::M500 => 16.0,
            Self::M1000 => 15.0,
            Self::M2000 => 14.0,
            Self::M5000 => 13.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::M500 => "500 m",
            Self::M1000 => "1 km",
            Self::M2000 => "2 km",
            Self::M5000 => "5 km",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ownership {
    Private,
    Govt,
}

impl Ownership {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Govt => "Govt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraStatus {
    #[serde(rename = "working")]
    Working,
    #[serde(rename = "not working")]
    NotWorking,
}

impl CameraStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Working => "working",
            Self::NotWorking => "not working",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Working => "Working",
            Self::NotWorking => "Not working",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraId(pub u64);

impl std::fmt::Display for CameraId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(pub u64);

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only projection of a camera record as served by the backend.
/// The list is wholesale-replaced on every successful proximity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: CameraId,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub private_govt: Ownership,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default)]
    pub coverage: String,
    #[serde(default)]
    pub backup: bool,
    #[serde(default)]
    pub connected_network: bool,
    pub status: CameraStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl TicketStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    #[must_use]
    pub fn valid_transitions(self) -> Vec<Self> {
        match self {
            Self::Pending => vec![Self::Accepted, Self::Rejected],
            Self::Accepted | Self::Rejected => vec![],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.valid_transitions().contains(&to)
    }

    pub fn validate_transition(self, to: Self) -> Result<(), TransitionError> {
        if self == to {
            return Err(TransitionError::SameStatus);
        }
        if self.is_terminal() {
            return Err(TransitionError::FromTerminalStatus { status: self });
        }
        if !self.can_transition_to(to) {
            return Err(TransitionError::InvalidTransition { from: self, to });
        }
        Ok(())
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Cannot transition to the same status")]
    SameStatus,
    #[error("Cannot transition from terminal status: {status}")]
    FromTerminalStatus { status: TicketStatus },
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: TicketStatus, to: TicketStatus },
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

/// The two outcomes a triage action can request for a pending ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketResolution {
    Accepted,
    Rejected,
}

impl TicketResolution {
    #[must_use]
    pub const fn as_status(self) -> TicketStatus {
        match self {
            Self::Accepted => TicketStatus::Accepted,
            Self::Rejected => TicketStatus::Rejected,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }

    #[must_use]
    pub const fn notification_title(self) -> &'static str {
        match self {
            Self::Accepted => "Ticket Accepted",
            Self::Rejected => "Ticket Rejected",
        }
    }

    #[must_use]
    pub const fn notification_description(self) -> &'static str {
        match self {
            Self::Accepted => "The ticket has been accepted.",
            Self::Rejected => "The ticket has been rejected.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub camera_id: CameraId,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub status: TicketStatus,
    pub reported_by: String,
    pub reported_at: String,
}

impl Ticket {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == TicketStatus::Pending
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("Untitled")
    }
}

/// What currently owns the single open overlay. Setting a new selection
/// atomically replaces the old one; there is never more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    None,
    Device,
    DroppedPin,
    Camera { index: usize },
    Ticket { id: TicketId },
}

impl Selection {
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub const fn is_camera(self) -> bool {
        matches!(self, Self::Camera { .. })
    }
}

/// Stamp carried by every outgoing proximity query. A response is applied
/// only if its stamp still equals the stamp derived from current state;
/// anything else is a superseded query and is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryStamp {
    pub origin: Origin,
    pub radius: SearchRadius,
    pub status_filter: Option<CameraStatus>,
    pub ownership_filter: Option<Ownership>,
}

/// Wire body for `POST /nearby_cameras`. Absent filters serialize as
/// `null`, which the backend reads as "no filter".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
    pub status_filter: Option<CameraStatus>,
    pub ownership_filter: Option<Ownership>,
}

impl NearbyQuery {
    #[must_use]
    pub fn from_stamp(stamp: &QueryStamp) -> Self {
        Self {
            latitude: stamp.origin.coordinate().lat(),
            longitude: stamp.origin.coordinate().lng(),
            radius_meters: stamp.radius.meters(),
            status_filter: stamp.status_filter,
            ownership_filter: stamp.ownership_filter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

/// Opaque configuration handed in by the shell at startup. The map key is
/// passed through to the view model untouched; the core never inspects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub api_base_url: String,
    pub map_api_key: String,
}

impl CoreConfig {
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url.trim_end_matches('/'))
    }
}

/// Camera detail fetched for a ticket under review, shown in the triage
/// dialog together with the ticket id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDetail {
    pub ticket_id: TicketId,
    pub camera: Camera,
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: CoreConfig,
    pub origin: Origin,
    pub radius: SearchRadius,
    pub status_filter: Option<CameraStatus>,
    pub ownership_filter: Option<Ownership>,
    pub cameras: Vec<Camera>,
    pub searching: bool,
    pub locating: bool,
    pub location_error: Option<AppError>,
    pub query_error: Option<AppError>,
    pub selection: Selection,
    pub tickets: Vec<Ticket>,
    pub tickets_loading: bool,
    pub tickets_error: Option<AppError>,
    pub pending_camera_fetch: Option<TicketId>,
    pub open_ticket: Option<TicketDetail>,
    pub submitting: Option<(TicketId, TicketResolution)>,
    pub triage_error: Option<AppError>,
    pub notification: Option<Notification>,
    pub notification_seq: u64,
}

impl Model {
    /// The stamp a query issued right now would carry. Responses are
    /// matched against this, so the last origin/radius change always wins.
    #[must_use]
    pub fn query_stamp(&self) -> QueryStamp {
        QueryStamp {
            origin: self.origin,
            radius: self.radius,
            status_filter: self.status_filter,
            ownership_filter: self.ownership_filter,
        }
    }

    pub fn pending_tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().filter(|t| t.is_pending())
    }

    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn dialog_ticket_id(&self) -> Option<TicketId> {
        self.open_ticket.as_ref().map(|d| d.ticket_id)
    }

    pub fn clear_errors(&mut self) {
        self.location_error = None;
        self.query_error = None;
        self.tickets_error = None;
        self.triage_error = None;
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Noop,

    Started {
        config: CoreConfig,
    },

    LocateRequested,
    FixResolved(Box<capabilities::GeolocationResult>),
    PinDropped {
        lat: f64,
        lng: f64,
    },
    RadiusSelected {
        meters: u32,
    },
    FiltersChanged {
        status_filter: Option<CameraStatus>,
        ownership_filter: Option<Ownership>,
    },
    NearbyCamerasResponse {
        stamp: QueryStamp,
        result: Box<capabilities::HttpResult>,
    },

    Selected {
        target: Selection,
    },

    TicketsRefreshRequested,
    TicketsResponse(Box<capabilities::HttpResult>),
    TicketOpened {
        ticket_id: TicketId,
    },
    TicketCameraResponse {
        ticket_id: TicketId,
        result: Box<capabilities::HttpResult>,
    },
    TicketResolved {
        ticket_id: TicketId,
        resolution: TicketResolution,
    },
    TicketStatusResponse {
        ticket_id: TicketId,
        resolution: TicketResolution,
        result: Box<capabilities::HttpResult>,
    },

    NotificationExpired {
        seq: u64,
    },
    ErrorDismissed,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Started { .. } => "started",
            Self::LocateRequested => "locate_requested",
            Self::FixResolved(_) => "fix_resolved",
            Self::PinDropped { .. } => "pin_dropped",
            Self::RadiusSelected { .. } => "radius_selected",
            Self::FiltersChanged { .. } => "filters_changed",
            Self::NearbyCamerasResponse { .. } => "nearby_cameras_response",
            Self::Selected { .. } => "selected",
            Self::TicketsRefreshRequested => "tickets_refresh_requested",
            Self::TicketsResponse(_) => "tickets_response",
            Self::TicketOpened { .. } => "ticket_opened",
            Self::TicketCameraResponse { .. } => "ticket_camera_response",
            Self::TicketResolved { .. } => "ticket_resolved",
            Self::TicketStatusResponse { .. } => "ticket_status_response",
            Self::NotificationExpired { .. } => "notification_expired",
            Self::ErrorDismissed => "error_dismissed",
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::Noop
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerKind {
    Device,
    DroppedPin,
    DefaultFallback,
    Camera { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerView {
    pub kind: MarkerKind,
    pub lat: f64,
    pub lng: f64,
    pub title: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraOverlay {
    pub id: u64,
    pub location: String,
    pub ownership: String,
    pub owner_name: String,
    pub contact_no: String,
    pub latitude: f64,
    pub longitude: f64,
    pub coverage: String,
    pub backup: bool,
    pub connected_network: bool,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayView {
    Origin {
        label: String,
        latitude: f64,
        longitude: f64,
    },
    Camera {
        detail: CameraOverlay,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: f64,
    pub map_api_key: String,
    pub radius_meters: u32,
    pub radius_options: Vec<u32>,
    pub markers: Vec<MarkerView>,
    pub searching: bool,
    pub locating: bool,
    pub location_error: Option<String>,
    pub query_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketCardView {
    pub id: u64,
    pub camera_id: u64,
    pub title: String,
    pub location: String,
    pub status: String,
    pub reported_by: String,
    pub reported_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketListView {
    pub items: Vec<TicketCardView>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDialogView {
    pub ticket_id: u64,
    pub camera: CameraOverlay,
    pub submitting: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationView {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub map: MapView,
    pub overlay: Option<OverlayView>,
    pub tickets: TicketListView,
    pub dialog: Option<TicketDialogView>,
    pub notification: Option<NotificationView>,
}

pub mod app {
    use super::{
        AppError, Camera, CameraId, CameraOverlay, ErrorKind, Event, MapView, MarkerKind,
        MarkerView, Model, NearbyQuery, Notification, NotificationView, Origin, OriginProvenance,
        OverlayView, QueryStamp, SearchRadius, Selection, Ticket, TicketCardView, TicketDetail,
        TicketDialogView, TicketId, TicketListView, TicketResolution, ValidatedCoordinate,
        ViewModel, CAMERA_DETAIL_TIMEOUT_MS, LOCATION_FIX_TIMEOUT_MS, NEARBY_QUERY_TIMEOUT_MS,
        NOTIFICATION_DURATION_MS, STATUS_UPDATE_TIMEOUT_MS, TICKETS_TIMEOUT_MS,
    };
    use crate::capabilities::{
        Capabilities, FixOptions, GeolocationError, GeolocationOutput, HttpError, HttpRequest,
        HttpResult, TimerId,
    };
    use tracing::{debug, warn};

    #[derive(Default)]
    pub struct App;

    impl App {
        fn issue_nearby_query(model: &mut Model, caps: &Capabilities) {
            let stamp = model.query_stamp();
            let query = NearbyQuery::from_stamp(&stamp);

            let request = HttpRequest::post(model.config.endpoint("/nearby_cameras"))
                .and_then(|r| r.with_json(&query))
                .and_then(|r| r.with_timeout_ms(NEARBY_QUERY_TIMEOUT_MS));

            let request = match request {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "could not build nearby-cameras request");
                    model.query_error = Some(
                        AppError::new(ErrorKind::Internal, "Could not issue camera search")
                            .with_internal(e.to_string()),
                    );
                    return;
                }
            };

            model.searching = true;
            model.query_error = None;

            caps.http.send(request, move |result| Event::NearbyCamerasResponse {
                stamp,
                result: Box::new(result),
            });
        }

        fn send_tickets_request(model: &Model, caps: &Capabilities) -> Result<(), AppError> {
            let request = HttpRequest::get(model.config.endpoint("/tickets"))
                .and_then(|r| r.with_timeout_ms(TICKETS_TIMEOUT_MS))
                .map_err(|e| {
                    AppError::new(ErrorKind::Internal, "Could not fetch tickets")
                        .with_internal(e.to_string())
                })?;

            caps.http
                .send(request, |result| Event::TicketsResponse(Box::new(result)));
            Ok(())
        }

        fn send_camera_detail_request(
            ticket_id: TicketId,
            camera_id: CameraId,
            model: &Model,
            caps: &Capabilities,
        ) -> Result<(), AppError> {
            let request = HttpRequest::get(model.config.endpoint(&format!("/cameras/{camera_id}")))
                .and_then(|r| r.with_timeout_ms(CAMERA_DETAIL_TIMEOUT_MS))
                .map_err(|e| {
                    AppError::new(ErrorKind::Internal, "Could not fetch camera details")
                        .with_internal(e.to_string())
                })?;

            caps.http.send(request, move |result| Event::TicketCameraResponse {
                ticket_id,
                result: Box::new(result),
            });
            Ok(())
        }

        fn send_status_update(
            ticket_id: TicketId,
            resolution: TicketResolution,
            model: &Model,
            caps: &Capabilities,
        ) -> Result<(), AppError> {
            let url = model.config.endpoint(&format!(
                "/tickets/{ticket_id}?status={}",
                resolution.as_str()
            ));

            let request = HttpRequest::put(url)
                .and_then(|r| r.with_json(&serde_json::json!({ "id": ticket_id.0 })))
                .and_then(|r| r.with_timeout_ms(STATUS_UPDATE_TIMEOUT_MS))
                .map_err(|e| {
                    AppError::new(ErrorKind::Internal, "Could not submit the ticket update")
                        .with_internal(e.to_string())
                })?;

            caps.http.send(request, move |result| Event::TicketStatusResponse {
                ticket_id,
                resolution,
                result: Box::new(result),
            });
            Ok(())
        }

        fn notify(
            model: &mut Model,
            caps: &Capabilities,
            title: impl Into<String>,
            description: impl Into<String>,
        ) {
            model.notification_seq += 1;
            let seq = model.notification_seq;
            model.notification = Some(Notification {
                title: title.into(),
                description: description.into(),
            });

            // A newer emit bumps the sequence, so this expiry is ignored
            // and the window effectively restarts.
            caps.timer
                .notify_after(TimerId(seq), NOTIFICATION_DURATION_MS, move |_| {
                    Event::NotificationExpired { seq }
                });
        }

        fn map_http_error(error: &HttpError) -> AppError {
            match error {
                HttpError::Network { message } => {
                    AppError::new(ErrorKind::Network, "Network error").with_internal(message)
                }
                HttpError::Timeout { timeout_ms } => {
                    AppError::new(ErrorKind::Timeout, "Request timed out")
                        .with_internal(format!("after {timeout_ms}ms"))
                }
                other => {
                    AppError::new(ErrorKind::Unknown, "Request failed")
                        .with_internal(other.to_string())
                }
            }
        }

        fn map_location_error(error: &GeolocationError) -> AppError {
            match error {
                GeolocationError::PermissionDenied => AppError::new(
                    ErrorKind::LocationPermissionDenied,
                    "Location permission denied",
                ),
                GeolocationError::Timeout { timeout_ms } => {
                    AppError::new(ErrorKind::Location, "Location request timed out")
                        .with_internal(format!("after {timeout_ms}ms"))
                }
                GeolocationError::Unsupported => {
                    AppError::new(ErrorKind::LocationUnsupported, "Geolocation not supported")
                }
                GeolocationError::Unavailable { reason } => {
                    AppError::new(ErrorKind::Location, "Location unavailable")
                        .with_internal(reason)
                }
            }
        }

        fn handle_nearby_response(stamp: QueryStamp, result: &HttpResult, model: &mut Model) {
            if stamp != model.query_stamp() {
                debug!("discarding stale proximity-query response");
                return;
            }

            model.searching = false;

            match result {
                Ok(response) if response.is_success() => {
                    match response.json::<Vec<Camera>>() {
                        Ok(cameras) => {
                            model.cameras = cameras;
                            model.query_error = None;
                            // The indexes a camera overlay points at belong
                            // to the list that was just replaced.
                            if model.selection.is_camera() {
                                model.selection = Selection::None;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "nearby-cameras response body did not parse");
                            model.query_error = Some(
                                AppError::new(
                                    ErrorKind::Deserialization,
                                    "Camera search returned unexpected data",
                                )
                                .with_internal(e.to_string()),
                            );
                        }
                    }
                }
                Ok(response) => {
                    model.query_error = Some(AppError::from_http_status(
                        response.status(),
                        Some(response.body()),
                    ));
                }
                Err(e) => {
                    model.query_error = Some(Self::map_http_error(e));
                }
            }
        }

        fn handle_tickets_response(result: &HttpResult, model: &mut Model) {
            model.tickets_loading = false;

            match result {
                Ok(response) if response.is_success() => match response.json::<Vec<Ticket>>() {
                    Ok(tickets) => {
                        model.tickets = tickets;
                        model.tickets_error = None;
                    }
                    Err(e) => {
                        warn!(error = %e, "ticket list response body did not parse");
                        model.tickets_error = Some(
                            AppError::new(
                                ErrorKind::Deserialization,
                                "Ticket list returned unexpected data",
                            )
                            .with_internal(e.to_string()),
                        );
                    }
                },
                Ok(response) => {
                    model.tickets_error = Some(AppError::from_http_status(
                        response.status(),
                        Some(response.body()),
                    ));
                }
                Err(e) => {
                    model.tickets_error = Some(Self::map_http_error(e));
                }
            }
        }

        fn handle_camera_detail_response(
            ticket_id: TicketId,
            result: &HttpResult,
            model: &mut Model,
        ) {
            if model.pending_camera_fetch != Some(ticket_id) {
                debug!(%ticket_id, "camera detail response no longer relevant");
                return;
            }
            model.pending_camera_fetch = None;

            match result {
                Ok(response) if response.is_success() => match response.json::<Camera>() {
                    Ok(camera) => {
                        model.open_ticket = Some(TicketDetail { ticket_id, camera });
                        model.selection = Selection::Ticket { id: ticket_id };
                        model.triage_error = None;
                    }
                    Err(e) => {
                        warn!(%ticket_id, error = %e, "camera detail did not parse; dialog stays closed");
                    }
                },
                Ok(response) if response.status() == 404 => {
                    warn!(%ticket_id, "camera referenced by ticket no longer exists");
                }
                Ok(response) => {
                    warn!(%ticket_id, status = response.status(), "camera detail fetch failed");
                }
                Err(e) => {
                    warn!(%ticket_id, error = %e, "camera detail fetch failed");
                }
            }
        }

        fn handle_status_response(
            ticket_id: TicketId,
            resolution: TicketResolution,
            result: &HttpResult,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            model.submitting = None;

            let failed = match result {
                Ok(response) if response.is_success() => None,
                Ok(response) => Some(AppError::from_http_status(
                    response.status(),
                    Some(response.body()),
                )),
                Err(e) => Some(Self::map_http_error(e)),
            };

            if let Some(error) = failed {
                // The ticket stays Pending and the dialog stays open so the
                // operator can retry.
                warn!(%ticket_id, error = %error, "ticket status update failed");
                model.triage_error = Some(error);
                return;
            }

            model.open_ticket = None;
            model.selection = Selection::None;
            model.triage_error = None;

            // Authoritative refresh instead of patching the cached list.
            model.tickets_loading = true;
            if let Err(e) = Self::send_tickets_request(model, caps) {
                model.tickets_loading = false;
                model.tickets_error = Some(e);
            }

            Self::notify(
                model,
                caps,
                resolution.notification_title(),
                resolution.notification_description(),
            );
        }

        fn build_markers(model: &Model) -> Vec<MarkerView> {
            let origin = model.origin;
            let origin_kind = match origin.provenance() {
                OriginProvenance::Device => MarkerKind::Device,
                OriginProvenance::DroppedPin => MarkerKind::DroppedPin,
                OriginProvenance::DefaultFallback => MarkerKind::DefaultFallback,
            };
            let origin_selected = matches!(
                model.selection,
                Selection::Device | Selection::DroppedPin
            );

            let mut markers = Vec::with_capacity(model.cameras.len() + 1);
            markers.push(MarkerView {
                kind: origin_kind,
                lat: origin.coordinate().lat(),
                lng: origin.coordinate().lng(),
                title: origin.provenance().label().to_string(),
                selected: origin_selected,
            });

            for (index, camera) in model.cameras.iter().enumerate() {
                markers.push(MarkerView {
                    kind: MarkerKind::Camera { index },
                    lat: camera.latitude,
                    lng: camera.longitude,
                    title: camera.location.clone(),
                    selected: model.selection == Selection::Camera { index },
                });
            }

            markers
        }

        fn camera_overlay(camera: &Camera) -> CameraOverlay {
            CameraOverlay {
                id: camera.id.0,
                location: camera.location.clone(),
                ownership: camera.private_govt.as_str().to_string(),
                owner_name: camera.owner_name.clone(),
                contact_no: camera.contact_no.clone(),
                latitude: camera.latitude,
                longitude: camera.longitude,
                coverage: camera.coverage.clone(),
                backup: camera.backup,
                connected_network: camera.connected_network,
                status: camera.status.display_name().to_string(),
            }
        }

        fn build_overlay(model: &Model) -> Option<OverlayView> {
            match model.selection {
                Selection::None | Selection::Ticket { .. } => None,
                Selection::Device | Selection::DroppedPin => Some(OverlayView::Origin {
                    label: model.origin.provenance().label().to_string(),
                    latitude: model.origin.coordinate().lat(),
                    longitude: model.origin.coordinate().lng(),
                }),
                Selection::Camera { index } => model
                    .cameras
                    .get(index)
                    .map(|camera| OverlayView::Camera {
                        detail: Self::camera_overlay(camera),
                    }),
            }
        }

        fn build_ticket_cards(model: &Model) -> Vec<TicketCardView> {
            model
                .pending_tickets()
                .map(|ticket| TicketCardView {
                    id: ticket.id.0,
                    camera_id: ticket.camera_id.0,
                    title: ticket.title().to_string(),
                    location: ticket.location.clone(),
                    status: ticket.status.as_str().to_string(),
                    reported_by: ticket.reported_by.clone(),
                    reported_at: ticket.reported_at.clone(),
                })
                .collect()
        }

        fn build_dialog(model: &Model) -> Option<TicketDialogView> {
            model.open_ticket.as_ref().map(|detail| TicketDialogView {
                ticket_id: detail.ticket_id.0,
                camera: Self::camera_overlay(&detail.camera),
                submitting: model
                    .submitting
                    .is_some_and(|(id, _)| id == detail.ticket_id),
                error: model
                    .triage_error
                    .as_ref()
                    .map(AppError::user_facing_message),
            })
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(event = event.name(), "handling event");

            match event {
                Event::Noop => {}

                Event::Started { config } => {
                    model.config = config;
                    self.update(Event::LocateRequested, model, caps);
                    self.update(Event::TicketsRefreshRequested, model, caps);
                }

                Event::LocateRequested => {
                    model.locating = true;
                    model.location_error = None;

                    let options =
                        FixOptions::default().with_timeout_ms(LOCATION_FIX_TIMEOUT_MS);
                    caps.geolocation
                        .get_fix(options, |result| Event::FixResolved(Box::new(result)));
                    caps.render.render();
                }

                Event::FixResolved(result) => {
                    model.locating = false;

                    match *result {
                        Ok(GeolocationOutput::Position(fix)) => {
                            match ValidatedCoordinate::new(fix.latitude, fix.longitude) {
                                Ok(coordinate) => {
                                    // A fresh fix supersedes any dropped pin.
                                    model.origin = Origin::device(coordinate);
                                    if model.selection == Selection::DroppedPin {
                                        model.selection = Selection::None;
                                    }
                                    model.location_error = None;
                                    Self::issue_nearby_query(model, caps);
                                }
                                Err(e) => {
                                    warn!(
                                        lat = fix.latitude,
                                        lng = fix.longitude,
                                        "device reported an invalid coordinate"
                                    );
                                    model.location_error = Some(e.into());
                                    model.origin = Origin::default_fallback();
                                    if model.selection == Selection::DroppedPin {
                                        model.selection = Selection::None;
                                    }
                                    Self::issue_nearby_query(model, caps);
                                }
                            }
                        }
                        Ok(GeolocationOutput::WatchCleared) => {
                            debug!("ignoring watch teardown acknowledgement");
                        }
                        Err(e) => {
                            warn!(error = %e, "device location unavailable, using default origin");
                            model.location_error = Some(Self::map_location_error(&e));
                            model.origin = Origin::default_fallback();
                            if model.selection == Selection::DroppedPin {
                                model.selection = Selection::None;
                            }
                            Self::issue_nearby_query(model, caps);
                        }
                    }

                    caps.render.render();
                }

                Event::PinDropped { lat, lng } => {
                    match ValidatedCoordinate::new(lat, lng) {
                        Ok(coordinate) => {
                            model.origin = Origin::dropped_pin(coordinate);
                            // A map click closes whatever overlay was open.
                            model.selection = Selection::None;
                            Self::issue_nearby_query(model, caps);
                        }
                        Err(e) => {
                            warn!(lat, lng, error = %e, "ignoring pin drop at invalid coordinate");
                        }
                    }
                    caps.render.render();
                }

                Event::RadiusSelected { meters } => {
                    match SearchRadius::from_meters(meters) {
                        Some(radius) => {
                            model.radius = radius;
                            Self::issue_nearby_query(model, caps);
                        }
                        None => {
                            warn!(meters, "ignoring radius outside the supported set");
                        }
                    }
                    caps.render.render();
                }

                Event::FiltersChanged {
                    status_filter,
                    ownership_filter,
                } => {
                    model.status_filter = status_filter;
                    model.ownership_filter = ownership_filter;
                    Self::issue_nearby_query(model, caps);
                    caps.render.render();
                }

                Event::NearbyCamerasResponse { stamp, result } => {
                    Self::handle_nearby_response(stamp, &result, model);
                    caps.render.render();
                }

                Event::Selected { target } => {
                    match target {
                        Selection::Ticket { id } => {
                            self.update(Event::TicketOpened { ticket_id: id }, model, caps);
                            return;
                        }
                        Selection::Camera { index } if index >= model.cameras.len() => {
                            warn!(index, "ignoring selection of unknown camera marker");
                        }
                        Selection::DroppedPin if !model.origin.is_pin() => {
                            warn!("ignoring pin selection while no pin is authoritative");
                        }
                        Selection::Device if model.origin.is_pin() => {
                            warn!("ignoring device selection while a pin is authoritative");
                        }
                        _ => {
                            model.selection = target;
                            model.open_ticket = None;
                            // Moving on invalidates any ticket-open fetch
                            // still in flight; its response must not reopen
                            // a dialog behind the operator's back.
                            model.pending_camera_fetch = None;
                        }
                    }
                    caps.render.render();
                }

                Event::TicketsRefreshRequested => {
                    model.tickets_loading = true;
                    model.tickets_error = None;

                    if let Err(e) = Self::send_tickets_request(model, caps) {
                        model.tickets_loading = false;
                        model.tickets_error = Some(e);
                    }
                    caps.render.render();
                }

                Event::TicketsResponse(result) => {
                    Self::handle_tickets_response(&result, model);
                    caps.render.render();
                }

                Event::TicketOpened { ticket_id } => {
                    let Some(ticket) = model.ticket(ticket_id) else {
                        warn!(%ticket_id, "ignoring open request for unknown ticket");
                        return;
                    };
                    if !ticket.is_pending() {
                        warn!(%ticket_id, status = %ticket.status, "ticket is no longer actionable");
                        return;
                    }
                    let camera_id = ticket.camera_id;

                    model.pending_camera_fetch = Some(ticket_id);
                    if let Err(e) =
                        Self::send_camera_detail_request(ticket_id, camera_id, model, caps)
                    {
                        warn!(%ticket_id, error = %e, "could not request camera details");
                        model.pending_camera_fetch = None;
                    }
                    caps.render.render();
                }

                Event::TicketCameraResponse { ticket_id, result } => {
                    Self::handle_camera_detail_response(ticket_id, &result, model);
                    caps.render.render();
                }

                Event::TicketResolved {
                    ticket_id,
                    resolution,
                } => {
                    if model.dialog_ticket_id() != Some(ticket_id) {
                        warn!(%ticket_id, "ignoring resolution for a ticket without an open dialog");
                        return;
                    }
                    if model.submitting.is_some() {
                        warn!(%ticket_id, "a status update is already in flight");
                        return;
                    }
                    let Some(ticket) = model.ticket(ticket_id) else {
                        warn!(%ticket_id, "ticket vanished from the store before resolution");
                        return;
                    };
                    if let Err(e) = ticket.status.validate_transition(resolution.as_status()) {
                        warn!(%ticket_id, error = %e, "refusing invalid status transition");
                        return;
                    }

                    model.submitting = Some((ticket_id, resolution));
                    model.triage_error = None;

                    if let Err(e) = Self::send_status_update(ticket_id, resolution, model, caps) {
                        model.submitting = None;
                        model.triage_error = Some(e);
                    }
                    caps.render.render();
                }

                Event::TicketStatusResponse {
                    ticket_id,
                    resolution,
                    result,
                } => {
                    if model.submitting != Some((ticket_id, resolution)) {
                        debug!(%ticket_id, "discarding response for a superseded status update");
                        return;
                    }
                    Self::handle_status_response(ticket_id, resolution, &result, model, caps);
                    caps.render.render();
                }

                Event::NotificationExpired { seq } => {
                    if seq == model.notification_seq {
                        model.notification = None;
                        caps.render.render();
                    } else {
                        debug!(seq, "ignoring expiry of a replaced notification");
                    }
                }

                Event::ErrorDismissed => {
                    model.clear_errors();
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel {
                map: MapView {
                    center_lat: model.origin.coordinate().lat(),
                    center_lng: model.origin.coordinate().lng(),
                    zoom: model.radius.zoom(),
                    map_api_key: model.config.map_api_key.clone(),
                    radius_meters: model.radius.meters(),
                    radius_options: SearchRadius::ALL.iter().map(|r| r.meters()).collect(),
                    markers: Self::build_markers(model),
                    searching: model.searching,
                    locating: model.locating,
                    location_error: model
                        .location_error
                        .as_ref()
                        .map(AppError::user_facing_message),
                    query_error: model
                        .query_error
                        .as_ref()
                        .map(AppError::user_facing_message),
                },
                overlay: Self::build_overlay(model),
                tickets: TicketListView {
                    items: Self::build_ticket_cards(model),
                    loading: model.tickets_loading,
                    error: model
                        .tickets_error
                        .as_ref()
                        .map(AppError::user_facing_message),
                },
                dialog: Self::build_dialog(model),
                notification: model.notification.as_ref().map(|n| NotificationView {
                    title: n.title.clone(),
                    description: n.description.clone(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rejects_nan_and_infinity() {
        assert!(ValidatedCoordinate::new(f64::NAN, 0.0).is_err());
        assert!(ValidatedCoordinate::new(0.0, f64::NAN).is_err());
        assert!(ValidatedCoordinate::new(f64::INFINITY, 0.0).is_err());
        assert!(ValidatedCoordinate::new(0.0, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(ValidatedCoordinate::new(91.0, 0.0).is_err());
        assert!(ValidatedCoordinate::new(-91.0, 0.0).is_err());
        assert!(ValidatedCoordinate::new(0.0, 181.0).is_err());
        assert!(ValidatedCoordinate::new(0.0, -181.0).is_err());
    }

    #[test]
    fn coordinate_accepts_bounds() {
        assert!(ValidatedCoordinate::new(90.0, 180.0).is_ok());
        assert!(ValidatedCoordinate::new(-90.0, -180.0).is_ok());
        assert!(ValidatedCoordinate::new(53.54, 10.0).is_ok());
    }

    #[test]
    fn default_origin_is_the_fallback() {
        let origin = Origin::default();
        assert_eq!(origin.provenance(), OriginProvenance::DefaultFallback);
        assert!((origin.coordinate().lat() - DEFAULT_ORIGIN_LAT).abs() < f64::EPSILON);
        assert!((origin.coordinate().lng() - DEFAULT_ORIGIN_LNG).abs() < f64::EPSILON);
    }

    #[test]
    fn radius_set_is_closed() {
        assert_eq!(SearchRadius::from_meters(500), Some(SearchRadius::M500));
        assert_eq!(SearchRadius::from_meters(1000), Some(SearchRadius::M1000));
        assert_eq!(SearchRadius::from_meters(2000), Some(SearchRadius::M2000));
        assert_eq!(SearchRadius::from_meters(5000), Some(SearchRadius::M5000));
        assert_eq!(SearchRadius::from_meters(0), None);
        assert_eq!(SearchRadius::from_meters(1500), None);
        assert_eq!(SearchRadius::default(), SearchRadius::M1000);
    }

    #[test]
    fn wider_radius_zooms_out() {
        let zooms: Vec<f64> = SearchRadius::ALL.iter().map(|r| r.zoom()).collect();
        assert!(zooms.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn camera_status_wire_strings() {
        let json = serde_json::to_string(&CameraStatus::NotWorking).unwrap();
        assert_eq!(json, "\"not working\"");
        let back: CameraStatus = serde_json::from_str("\"working\"").unwrap();
        assert_eq!(back, CameraStatus::Working);
    }

    #[test]
    fn ticket_transitions_are_pending_only() {
        assert!(TicketStatus::Pending
            .validate_transition(TicketStatus::Accepted)
            .is_ok());
        assert!(TicketStatus::Pending
            .validate_transition(TicketStatus::Rejected)
            .is_ok());

        assert_eq!(
            TicketStatus::Accepted.validate_transition(TicketStatus::Rejected),
            Err(TransitionError::FromTerminalStatus {
                status: TicketStatus::Accepted
            })
        );
        assert_eq!(
            TicketStatus::Pending.validate_transition(TicketStatus::Pending),
            Err(TransitionError::SameStatus)
        );
        assert_eq!(
            TicketStatus::Accepted.validate_transition(TicketStatus::Accepted),
            Err(TransitionError::SameStatus)
        );
        assert!(TicketStatus::Accepted.valid_transitions().is_empty());
        assert!(TicketStatus::Rejected.valid_transitions().is_empty());
    }

    #[test]
    fn resolution_maps_to_status_and_copy() {
        assert_eq!(TicketResolution::Accepted.as_status(), TicketStatus::Accepted);
        assert_eq!(TicketResolution::Rejected.as_status(), TicketStatus::Rejected);
        assert_eq!(TicketResolution::Accepted.notification_title(), "Ticket Accepted");
        assert_eq!(
            TicketResolution::Rejected.notification_description(),
            "The ticket has been rejected."
        );
    }

    #[test]
    fn ticket_title_falls_back_to_untitled() {
        let mut ticket = Ticket {
            id: TicketId(1),
            camera_id: CameraId(2),
            description: None,
            location: "Dock 4".into(),
            status: TicketStatus::Pending,
            reported_by: "operator".into(),
            reported_at: "2024-05-01T10:00:00Z".into(),
        };
        assert_eq!(ticket.title(), "Untitled");

        ticket.description = Some(String::new());
        assert_eq!(ticket.title(), "Untitled");

        ticket.description = Some("Lens cracked".into());
        assert_eq!(ticket.title(), "Lens cracked");
    }

    #[test]
    fn query_stamp_tracks_origin_radius_and_filters() {
        let mut model = Model::default();
        let before = model.query_stamp();
        assert_eq!(before, model.query_stamp());

        let coord = ValidatedCoordinate::new(53.55, 10.01).unwrap();
        model.origin = Origin::dropped_pin(coord);
        assert_ne!(before, model.query_stamp());

        let after_pin = model.query_stamp();
        model.radius = SearchRadius::M2000;
        assert_ne!(after_pin, model.query_stamp());

        let after_radius = model.query_stamp();
        model.status_filter = Some(CameraStatus::Working);
        assert_ne!(after_radius, model.query_stamp());
    }

    #[test]
    fn nearby_query_serializes_null_filters() {
        let model = Model::default();
        let query = NearbyQuery::from_stamp(&model.query_stamp());
        let value = serde_json::to_value(&query).unwrap();

        assert_eq!(value["radius_meters"], 1000);
        assert!(value["status_filter"].is_null());
        assert!(value["ownership_filter"].is_null());
    }

    #[test]
    fn selection_serializes_tagged() {
        let value = serde_json::to_value(Selection::Camera { index: 3 }).unwrap();
        assert_eq!(value["type"], "camera");
        assert_eq!(value["index"], 3);

        let value = serde_json::to_value(Selection::None).unwrap();
        assert_eq!(value["type"], "none");
    }

    #[test]
    fn config_endpoint_joins_cleanly() {
        let config = CoreConfig {
            api_base_url: "http://127.0.0.1:8000/".into(),
            map_api_key: "opaque".into(),
        };
        assert_eq!(config.endpoint("/tickets"), "http://127.0.0.1:8000/tickets");
        assert_eq!(
            config.endpoint("/cameras/7"),
            "http://127.0.0.1:8000/cameras/7"
        );
    }

    #[test]
    fn error_from_http_status_maps_kinds() {
        assert_eq!(AppError::from_http_status(404, None).kind, ErrorKind::NotFound);
        assert_eq!(AppError::from_http_status(400, None).kind, ErrorKind::Validation);
        assert_eq!(AppError::from_http_status(503, None).kind, ErrorKind::Internal);
        assert_eq!(AppError::from_http_status(418, None).kind, ErrorKind::Unknown);

        let body = br#"{"message": "camera not found"}"#;
        let error = AppError::from_http_status(404, Some(body));
        assert_eq!(error.message, "camera not found");
    }

    #[test]
    fn camera_parses_backend_record() {
        let json = r#"{
            "id": 12,
            "location": "Harbor gate",
            "latitude": 53.54,
            "longitude": 10.0,
            "private_govt": "Govt",
            "owner_name": "Port Authority",
            "contact_no": "040-123456",
            "coverage": "Gate and forecourt",
            "backup": true,
            "connected_network": false,
            "status": "not working"
        }"#;

        let camera: Camera = serde_json::from_str(json).unwrap();
        assert_eq!(camera.id, CameraId(12));
        assert_eq!(camera.private_govt, Ownership::Govt);
        assert_eq!(camera.status, CameraStatus::NotWorking);
        assert!(camera.backup);
        assert!(!camera.connected_network);
    }

    #[test]
    fn pending_view_filters_resolved_tickets() {
        let ticket = |id: u64, status: TicketStatus| Ticket {
            id: TicketId(id),
            camera_id: CameraId(id),
            description: None,
            location: String::new(),
            status,
            reported_by: String::new(),
            reported_at: String::new(),
        };

        let model = Model {
            tickets: vec![
                ticket(1, TicketStatus::Pending),
                ticket(2, TicketStatus::Accepted),
                ticket(3, TicketStatus::Rejected),
                ticket(4, TicketStatus::Pending),
            ],
            ..Model::default()
        };

        let pending: Vec<u64> = model.pending_tickets().map(|t| t.id.0).collect();
        assert_eq!(pending, vec![1, 4]);
    }
}
