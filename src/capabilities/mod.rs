mod geolocation;
mod http;
mod timer;

pub use self::geolocation::{
    FixOptions, Geolocation, GeolocationError, GeolocationOperation, GeolocationOutput,
    GeolocationResult, PositionFix, WatchId,
};
pub use self::http::{
    Http, HttpError, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpResult, ValidatedUrl,
};
pub use self::timer::{Timer, TimerId, TimerOperation, TimerOutput};

pub use crux_core::render::Render;

use crate::app::App;
use crate::Event;

pub type AppHttp = Http<Event>;
pub type AppGeolocation = Geolocation<Event>;
pub type AppTimer = Timer<Event>;
pub type AppRender = Render<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub geolocation: Geolocation<Event>,
    pub timer: Timer<Event>,
    pub render: Render<Event>,
}
