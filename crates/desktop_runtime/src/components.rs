//! Desktop shell UI composition and interaction surfaces.

mod focus;
mod menus;
mod overlays;

use leptos::*;

use self::{
    menus::{DesktopContextMenu, IconContextMenu},
    overlays::{NoticeBar, SessionBar, ShortcutDialog, SignInOverlay},
};

use crate::{
    config::icon_config,
    drag::{PointerDevice, PointerDown, PointerPosition},
    layout::icon_footprint,
    model::{IconId, IconLayerVisibility, IconPosition},
    reducer::DesktopAction,
};

pub use crate::runtime_context::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext};

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

fn pointer_from_mouse_event(ev: &web_sys::MouseEvent) -> PointerPosition {
    PointerPosition::new(ev.client_x(), ev.client_y())
}

fn first_touch(ev: &web_sys::TouchEvent) -> Option<PointerPosition> {
    let touch = ev.touches().get(0)?;
    Some(PointerPosition::new(touch.client_x(), touch.client_y()))
}

/// The surface fills the viewport, so client coordinates are surface coordinates.
fn surface_point(ev: &web_sys::MouseEvent) -> IconPosition {
    IconPosition::new(ev.client_x(), ev.client_y())
}

fn has_active_drag(runtime: DesktopRuntimeContext, device: PointerDevice) -> bool {
    runtime
        .interaction
        .with_untracked(|interaction| interaction.drag.active_icon(device).is_some())
}

fn install_pointer_listeners(runtime: DesktopRuntimeContext) {
    let mouse_move = window_event_listener(ev::mousemove, move |ev| {
        if has_active_drag(runtime, PointerDevice::Mouse) {
            runtime.dispatch_action(DesktopAction::PointerMoved {
                device: PointerDevice::Mouse,
                pointer: pointer_from_mouse_event(&ev),
            });
        }
    });
    let mouse_up = window_event_listener(ev::mouseup, move |_| {
        if has_active_drag(runtime, PointerDevice::Mouse) {
            runtime.dispatch_action(DesktopAction::PointerReleased {
                device: PointerDevice::Mouse,
            });
        }
    });
    let touch_move = window_event_listener(ev::touchmove, move |ev| {
        if !has_active_drag(runtime, PointerDevice::Touch) {
            return;
        }
        if let Some(pointer) = first_touch(&ev) {
            runtime.dispatch_action(DesktopAction::PointerMoved {
                device: PointerDevice::Touch,
                pointer,
            });
        }
    });
    let touch_end = window_event_listener(ev::touchend, move |_| {
        if has_active_drag(runtime, PointerDevice::Touch) {
            runtime.dispatch_action(DesktopAction::PointerReleased {
                device: PointerDevice::Touch,
            });
        }
    });
    let key_down = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() || ev.key() != "Escape" {
            return;
        }
        runtime.dispatch_action(DesktopAction::Escape);
    });
    let resize = window_event_listener(ev::resize, move |_| {
        if runtime.state.with_untracked(|state| state.context_menu.is_open()) {
            runtime.dispatch_action(DesktopAction::CloseMenus);
        }
    });

    on_cleanup(move || {
        mouse_move.remove();
        mouse_up.remove();
        touch_move.remove();
        touch_end.remove();
        key_down.remove();
        resize.remove();
    });
}

#[component]
/// Renders the desktop surface, its icons, menus, and overlays.
pub fn DesktopShell() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;

    install_pointer_listeners(runtime);

    let wallpaper_style = move || {
        state.with(|state| match &state.background_url {
            Some(url) => format!(
                "background-image:url('{}');",
                url.replace('\'', "%27")
            ),
            None => String::new(),
        })
    };
    let icons_hidden = move || state.with(|state| state.icon_layer == IconLayerVisibility::Hidden);
    let signed_in = move || state.with(|state| state.session.is_signed_in());

    view! {
        <div
            id="desktop-shell-root"
            class="desktop-shell"
            tabindex="-1"
            data-ui-kind="desktop-root"
            on:click=move |_| {
                if state.with_untracked(|state| state.context_menu.is_open()) {
                    runtime.dispatch_action(DesktopAction::CloseMenus);
                }
            }
        >
            <div
                id="desktop"
                class="desktop-surface"
                data-ui-slot="wallpaper-layer"
                style=wallpaper_style
                on:contextmenu=move |ev: web_sys::MouseEvent| {
                    stop_mouse_event(&ev);
                    runtime.dispatch_action(DesktopAction::OpenDesktopMenu {
                        pointer: surface_point(&ev),
                        surface: runtime.host.with_value(|host| host.desktop_surface_size()),
                    });
                }
            >
                <Show when=signed_in fallback=|| ()>
                    <div
                        class="desktop-icons"
                        data-ui-slot="icon-layer"
                        aria-hidden=move || icons_hidden().to_string()
                        style=move || if icons_hidden() { "display:none;" } else { "" }
                    >
                        <For
                            each=move || {
                                state.with(|state| {
                                    state
                                        .icons
                                        .iter()
                                        .map(|icon| icon.id.clone())
                                        .collect::<Vec<_>>()
                                })
                            }
                            key=|icon_id| icon_id.clone()
                            let:icon_id
                        >
                            <DesktopIconView icon_id />
                        </For>
                    </div>
                </Show>

                <DesktopContextMenu />
                <IconContextMenu />
            </div>

            <SessionBar />
            <NoticeBar />
            <ShortcutDialog />
            <SignInOverlay />
        </div>
    }
}

#[component]
fn DesktopIconView(icon_id: IconId) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let sizing = &icon_config().icon;
    let icon = {
        let icon_id = icon_id.clone();
        create_memo(move |_| runtime.state.with(|state| state.icons.get(&icon_id).cloned()))
    };
    let dragging = {
        let icon_id = icon_id.clone();
        move || {
            runtime
                .interaction
                .with(|interaction| interaction.drag.phase(&icon_id).is_dragging())
        }
    };

    let on_mouse_down = {
        let icon_id = icon_id.clone();
        move |ev: web_sys::MouseEvent| {
            if ev.button() == crate::drag::PRIMARY_BUTTON {
                ev.prevent_default();
            }
            runtime.dispatch_action(DesktopAction::IconPointerDown {
                icon_id: icon_id.clone(),
                input: PointerDown::mouse(ev.button(), pointer_from_mouse_event(&ev)),
            });
        }
    };
    let on_touch_start = {
        let icon_id = icon_id.clone();
        move |ev: web_sys::TouchEvent| {
            let Some(pointer) = first_touch(&ev) else {
                return;
            };
            runtime.dispatch_action(DesktopAction::IconPointerDown {
                icon_id: icon_id.clone(),
                input: PointerDown::touch(ev.touches().length(), pointer),
            });
        }
    };
    let on_click = {
        let icon_id = icon_id.clone();
        move |_: web_sys::MouseEvent| {
            runtime.dispatch_action(DesktopAction::IconClicked {
                icon_id: icon_id.clone(),
            });
        }
    };
    let on_context_menu = {
        let icon_id = icon_id.clone();
        move |ev: web_sys::MouseEvent| {
            stop_mouse_event(&ev);
            runtime.dispatch_action(DesktopAction::OpenIconMenu {
                icon_id: icon_id.clone(),
                pointer: surface_point(&ev),
                surface: runtime.host.with_value(|host| host.desktop_surface_size()),
            });
        }
    };
    let on_key_down = {
        let icon_id = icon_id.clone();
        move |ev: web_sys::KeyboardEvent| {
            if ev.key() == "Enter" {
                ev.prevent_default();
                runtime.dispatch_action(DesktopAction::IconCommand {
                    icon_id: icon_id.clone(),
                    command: crate::reducer::IconCommand::Open,
                });
            }
        }
    };

    move || {
        icon.get().map(|icon| {
            let footprint = icon_footprint(&icon, sizing);
            let container_style = format!(
                "left:{}px;top:{}px;width:{}px;height:{}px;",
                icon.position.x, icon.position.y, footprint.width, footprint.height
            );
            let image_style = format!("width:{0}px;height:{0}px;", footprint.image);
            let image_src = icon.image_src(sizing).to_string();
            let dragging = dragging.clone();

            view! {
                <div
                    class=move || if dragging() { "desktop-icon dragging" } else { "desktop-icon" }
                    role="button"
                    tabindex="0"
                    data-id=icon.id.to_string()
                    title=icon.url.clone()
                    style=container_style
                    on:mousedown=on_mouse_down.clone()
                    on:touchstart=on_touch_start.clone()
                    on:click=on_click.clone()
                    on:contextmenu=on_context_menu.clone()
                    on:keydown=on_key_down.clone()
                >
                    <img src=image_src alt="" draggable="false" style=image_style />
                    <span class="label">{icon.name.clone()}</span>
                </div>
            }
        })
    }
}

