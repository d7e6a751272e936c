use crate::router::Route;
use watio_access::Destination;
use yew_router::prelude::Navigator;

/// Command navigation over the app router.
pub struct RouterNavigator {
    inner: Option<Navigator>,
}

impl RouterNavigator {
    #[must_use]
    pub const fn new(inner: Option<Navigator>) -> Self {
        Self { inner }
    }
}

impl watio_access::Navigator for RouterNavigator {
    fn navigate(&mut self, destination: Destination) {
        match &self.inner {
            Some(navigator) => navigator.push(&Route::from(destination)),
            None => log::warn!("no router mounted; cannot open {}", destination.path()),
        }
    }

    fn go_back(&mut self) {
        match &self.inner {
            Some(navigator) => navigator.back(),
            None => log::warn!("no router mounted; cannot go back"),
        }
    }
}
