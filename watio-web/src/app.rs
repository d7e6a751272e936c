use crate::a11y::MAIN_CONTENT_ID;
use crate::components::{AccessibilityFeatures, AccessibilityPanel};
use crate::context::AccessibilityProvider;
use crate::router::Route;
use yew::prelude::*;
use yew_router::prelude::*;

/// Top-level component: router, accessibility context, page shell.
#[function_component(App)]
pub fn app() -> Html {
    let basename = crate::config::router_base();
    html! {
        <BrowserRouter basename={basename}>
            <AppShell />
        </BrowserRouter>
    }
}

/// Everything below the router, split out so it can render without a browser history.
#[function_component(AppShell)]
pub fn app_shell() -> Html {
    html! {
        <AccessibilityProvider>
            <AccessibilityFeatures />
            <header class="navbar">
                <nav aria-label="Principal">
                    <Link<Route> to={Route::Home}>{"Inicio"}</Link<Route>>
                    <Link<Route> to={Route::Dashboard}>{"Panel"}</Link<Route>>
                    <Link<Route> to={Route::Profile}>{"Perfil"}</Link<Route>>
                </nav>
            </header>
            <main id={MAIN_CONTENT_ID} tabindex="-1">
                <Switch<Route> render={switch} />
            </main>
        </AccessibilityProvider>
    }
}

fn switch(route: Route) -> Html {
    let body = match route {
        Route::Profile => html! { <AccessibilityPanel /> },
        Route::NotFound => html! { <p>{"La página que buscas no existe."}</p> },
        Route::Home | Route::Dashboard | Route::Admin | Route::Auth => html! {},
    };
    html! {
        <section aria-labelledby="page-title">
            <h1 id="page-title">{ route.title() }</h1>
            { body }
        </section>
    }
}
