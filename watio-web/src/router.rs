use watio_access::Destination;
use yew_router::prelude::*;

#[derive(Clone, Debug, Routable, PartialEq, Eq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/dashboard")]
    Dashboard,
    #[at("/profile")]
    Profile,
    #[at("/admin")]
    Admin,
    #[at("/auth")]
    Auth,
    #[at("/404")]
    #[not_found]
    NotFound,
}

impl From<Destination> for Route {
    fn from(destination: Destination) -> Self {
        match destination {
            Destination::Home => Self::Home,
            Destination::Dashboard => Self::Dashboard,
            Destination::Profile => Self::Profile,
        }
    }
}

impl Route {
    /// Section name shown in the shell heading.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Home => "Inicio",
            Self::Dashboard => "Panel de consumo",
            Self::Profile => "Perfil",
            Self::Admin => "Administración",
            Self::Auth => "Acceso",
            Self::NotFound => "Página no encontrada",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations_map_to_their_paths() {
        for destination in [Destination::Home, Destination::Dashboard, Destination::Profile] {
            assert_eq!(Route::from(destination).to_path(), destination.path());
        }
    }

    #[test]
    fn unknown_paths_fall_back_to_not_found() {
        assert_eq!(Route::recognize("/nope"), Some(Route::NotFound));
        assert_eq!(Route::recognize("/dashboard"), Some(Route::Dashboard));
    }
}
