use super::{
    focus::{focus_element_by_id, focus_first_menu_item, handle_menu_roving_keydown},
    *,
};
use crate::{
    layout::{MenuPlacement, ResizePreset},
    model::ContextMenuState,
    reducer::IconCommand,
};

const DESKTOP_MENU_ID: &str = "desktop-context-menu";
const ICON_MENU_ID: &str = "icon-context-menu";

fn menu_class(at: MenuPlacement) -> &'static str {
    if at.submenu_left {
        "context-menu sub-left"
    } else {
        "context-menu"
    }
}

fn menu_style(at: MenuPlacement) -> String {
    format!("left:{}px;top:{}px;", at.x, at.y)
}

fn on_menu_keydown(ev: &web_sys::KeyboardEvent, menu_id: &str, runtime: DesktopRuntimeContext) {
    if handle_menu_roving_keydown(ev, menu_id) {
        return;
    }
    if ev.key() == "Escape" {
        ev.prevent_default();
        ev.stop_propagation();
        runtime.dispatch_action(DesktopAction::CloseMenus);
        let _ = focus_element_by_id("desktop-shell-root");
    }
}

/// Focuses the first item whenever `menu_id` opens.
fn focus_menu_on_open(runtime: DesktopRuntimeContext, menu_id: &'static str, is_icon_menu: bool) {
    create_effect(move |was_open: Option<bool>| {
        let is_open = runtime.state.with(|state| match &state.context_menu {
            ContextMenuState::Hidden => false,
            ContextMenuState::Desktop { .. } => !is_icon_menu,
            ContextMenuState::Icon { .. } => is_icon_menu,
        });
        if is_open && !was_open.unwrap_or(false) {
            let _ = focus_first_menu_item(menu_id);
        }
        is_open
    });
}

#[component]
fn MenuItem(
    id: &'static str,
    label: &'static str,
    on_select: Callback<()>,
) -> impl IntoView {
    view! {
        <button
            id=id
            role="menuitem"
            class="context-menu-item"
            on:click:undelegated=move |ev: web_sys::MouseEvent| {
                stop_mouse_event(&ev);
                on_select.call(());
            }
        >
            {label}
        </button>
    }
}

#[component]
pub(super) fn DesktopContextMenu() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    focus_menu_on_open(runtime, DESKTOP_MENU_ID, false);

    let placement = move || {
        state.with(|state| match state.context_menu {
            ContextMenuState::Desktop { at } => Some(at),
            _ => None,
        })
    };
    let surface_width = move || runtime.host.with_value(|host| host.desktop_surface_size().width);

    move || {
        placement().map(|at| {
            let icons_visible =
                state.with_untracked(|state| state.icon_layer == IconLayerVisibility::Visible);
            view! {
                <div
                    id=DESKTOP_MENU_ID
                    class=menu_class(at)
                    role="menu"
                    aria-label="Desktop context menu"
                    style=menu_style(at)
                    on:keydown=move |ev: web_sys::KeyboardEvent| {
                        on_menu_keydown(&ev, DESKTOP_MENU_ID, runtime)
                    }
                    on:mousedown=move |ev| ev.stop_propagation()
                    on:click=move |ev| ev.stop_propagation()
                    on:contextmenu=move |ev: web_sys::MouseEvent| stop_mouse_event(&ev)
                >
                    <MenuItem
                        id="cm-new-shortcut"
                        label="New shortcut..."
                        on_select=Callback::new(move |_| {
                            runtime.dispatch_action(DesktopAction::OpenShortcutDialog)
                        })
                    />
                    <MenuItem
                        id="cm-auto-arrange"
                        label="Auto arrange icons"
                        on_select=Callback::new(move |_| {
                            runtime.dispatch_action(DesktopAction::AutoArrange {
                                surface_width: surface_width(),
                            })
                        })
                    />
                    {if icons_visible {
                        view! {
                            <MenuItem
                                id="cm-hide-icons"
                                label="Hide desktop icons"
                                on_select=Callback::new(move |_| {
                                    runtime.dispatch_action(DesktopAction::SetIconLayer(
                                        IconLayerVisibility::Hidden,
                                    ))
                                })
                            />
                        }
                    } else {
                        view! {
                            <MenuItem
                                id="cm-show-icons"
                                label="Show desktop icons"
                                on_select=Callback::new(move |_| {
                                    runtime.dispatch_action(DesktopAction::SetIconLayer(
                                        IconLayerVisibility::Visible,
                                    ))
                                })
                            />
                        }
                    }}
                    <div class="context-menu-separator" role="separator" aria-hidden="true"></div>
                    <MenuItem
                        id="cm-refresh"
                        label="Refresh"
                        on_select=Callback::new(move |_| {
                            runtime.dispatch_action(DesktopAction::Refresh)
                        })
                    />
                </div>
            }
        })
    }
}

#[component]
pub(super) fn IconContextMenu() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    focus_menu_on_open(runtime, ICON_MENU_ID, true);

    let target = move || {
        state.with(|state| match &state.context_menu {
            ContextMenuState::Icon { icon_id, at } => Some((icon_id.clone(), *at)),
            _ => None,
        })
    };

    move || {
        target().map(|(icon_id, at)| {
            let command = move |command: IconCommand| {
                let icon_id = icon_id.clone();
                Callback::new(move |_| {
                    runtime.dispatch_action(DesktopAction::IconCommand {
                        icon_id: icon_id.clone(),
                        command,
                    })
                })
            };
            let resize_items = ResizePreset::ALL
                .into_iter()
                .map(|preset| {
                    let label = preset.label();
                    let on_select = command(IconCommand::Resize(preset));
                    view! {
                        <button
                            role="menuitem"
                            class="context-menu-item"
                            on:click:undelegated=move |ev: web_sys::MouseEvent| {
                                stop_mouse_event(&ev);
                                on_select.call(());
                            }
                        >
                            {label}
                        </button>
                    }
                })
                .collect_view();

            view! {
                <div
                    id=ICON_MENU_ID
                    class=menu_class(at)
                    role="menu"
                    aria-label="Icon context menu"
                    style=menu_style(at)
                    on:keydown=move |ev: web_sys::KeyboardEvent| {
                        on_menu_keydown(&ev, ICON_MENU_ID, runtime)
                    }
                    on:mousedown=move |ev| ev.stop_propagation()
                    on:click=move |ev| ev.stop_propagation()
                    on:contextmenu=move |ev: web_sys::MouseEvent| stop_mouse_event(&ev)
                >
                    <MenuItem id="icm-open" label="Open" on_select=command(IconCommand::Open) />
                    <MenuItem
                        id="icm-change-icon"
                        label="Change icon..."
                        on_select=command(IconCommand::ChangeImage)
                    />
                    <div class="context-menu-submenu" role="group" aria-label="Icon size">
                        <span class="context-menu-group-label">"Icon size"</span>
                        <div class="context-menu-submenu-items">{resize_items}</div>
                    </div>
                    <div class="context-menu-separator" role="separator" aria-hidden="true"></div>
                    <MenuItem
                        id="icm-delete"
                        label="Delete"
                        on_select=command(IconCommand::Delete)
                    />
                </div>
            }
        })
    }
}
