//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::pages::HomePage;
use crate::toast::{ToastHost, provide_toasts};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_toasts();

    view! {
        <Router>
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=HomePage />
                </Routes>
            </main>
            <ToastHost />
        </Router>
    }
}
