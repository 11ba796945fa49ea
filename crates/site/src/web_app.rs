use desktop_runtime::{DesktopProvider, DesktopShell};
use leptos::*;
use leptos_meta::*;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Web Desktop" />
        <Meta name="description" content="A browser desktop with persistent shortcut icons." />

        <main class="site-root">
            <DesktopEntry />
        </main>
    }
}

/// Mounts the desktop shell against the host bundle selected at compile time.
#[component]
pub fn DesktopEntry() -> impl IntoView {
    let host_services = platform_host_web::build_host_services();

    view! {
        <DesktopProvider host_services=host_services>
            <DesktopShell />
        </DesktopProvider>
    }
}
