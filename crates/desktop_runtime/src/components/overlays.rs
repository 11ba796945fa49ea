use super::{focus::focus_element_by_id, *};
use crate::model::{SessionState, ShortcutDialogState};

fn input_value(node: NodeRef<html::Input>) -> String {
    node.get_untracked()
        .map(|input| input.value())
        .unwrap_or_default()
}

fn clear_input(node: NodeRef<html::Input>) {
    if let Some(input) = node.get_untracked() {
        input.set_value("");
    }
}

#[component]
pub(super) fn ShortcutDialog() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let name_input = create_node_ref::<html::Input>();
    let url_input = create_node_ref::<html::Input>();

    let dialog = move || state.with(|state| state.shortcut_dialog.clone());
    let is_open = move || state.with(|state| state.shortcut_dialog.is_open());
    let submitting =
        move || state.with(|state| state.shortcut_dialog == ShortcutDialogState::Submitting);
    let error = move || match dialog() {
        ShortcutDialogState::Editing { error } => error,
        _ => None,
    };

    // Fresh inputs every time the dialog opens.
    create_effect(move |was_open: Option<bool>| {
        let open = is_open();
        if open && !was_open.unwrap_or(false) {
            clear_input(name_input);
            clear_input(url_input);
            let _ = focus_element_by_id("shortcut-name");
        }
        open
    });

    let submit = move || {
        if submitting() {
            return;
        }
        let surface_width = runtime.host.with_value(|host| host.desktop_surface_size().width);
        runtime.dispatch_action(DesktopAction::SubmitShortcut {
            name: input_value(name_input),
            url: input_value(url_input),
            surface_width,
        });
    };
    let on_input_keydown = move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
        "Enter" => {
            ev.prevent_default();
            submit();
        }
        "Escape" => {
            ev.prevent_default();
            ev.stop_propagation();
            runtime.dispatch_action(DesktopAction::CancelShortcutDialog);
        }
        _ => {}
    };

    view! {
        <div
            class="modal-backdrop"
            style=move || if is_open() { "" } else { "display:none;" }
            on:click=move |ev| ev.stop_propagation()
            on:contextmenu=move |ev: web_sys::MouseEvent| stop_mouse_event(&ev)
        >
            <div
                class="modal shortcut-dialog"
                role="dialog"
                aria-modal="true"
                aria-labelledby="shortcut-dialog-title"
            >
                <h2 id="shortcut-dialog-title">"New shortcut"</h2>
                <label for="shortcut-name">"Name"</label>
                <input
                    id="shortcut-name"
                    type="text"
                    autocomplete="off"
                    node_ref=name_input
                    disabled=submitting
                    on:keydown=on_input_keydown
                />
                <label for="shortcut-url">"URL"</label>
                <input
                    id="shortcut-url"
                    type="text"
                    placeholder="example.com"
                    autocomplete="off"
                    node_ref=url_input
                    disabled=submitting
                    on:keydown=on_input_keydown
                />
                <p class="form-error" role="alert">{move || error().unwrap_or_default()}</p>
                <div class="modal-actions">
                    <button
                        type="button"
                        on:click=move |_| {
                            runtime.dispatch_action(DesktopAction::CancelShortcutDialog)
                        }
                    >
                        "Cancel"
                    </button>
                    <button
                        type="button"
                        class="primary"
                        disabled=submitting
                        on:click=move |_| submit()
                    >
                        {move || if submitting() { "Creating..." } else { "Create" }}
                    </button>
                </div>
            </div>
        </div>
    }
}

fn session_error(session: &SessionState) -> String {
    match session {
        SessionState::SignedOut { error } | SessionState::Registering { error } => {
            error.clone().unwrap_or_default()
        }
        _ => String::new(),
    }
}

#[component]
pub(super) fn SignInOverlay() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let state = runtime.state;
    let username_input = create_node_ref::<html::Input>();
    let password_input = create_node_ref::<html::Input>();
    let email_input = create_node_ref::<html::Input>();

    let session = move || state.with(|state| state.session.clone());
    let hidden = move || state.with(|state| state.session.is_signed_in());
    let busy = move || state.with(|state| state.session.is_busy());
    let registering = move || {
        matches!(
            session(),
            SessionState::Registering { .. } | SessionState::SubmittingRegistration
        )
    };

    let submit = move || {
        if busy() {
            return;
        }
        let username = input_value(username_input);
        let password = input_value(password_input);
        clear_input(password_input);
        if registering() {
            runtime.dispatch_action(DesktopAction::SubmitRegistration {
                username,
                password,
                email: input_value(email_input),
            });
        } else {
            runtime.dispatch_action(DesktopAction::SubmitLogin { username, password });
        }
    };
    let toggle_mode = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        clear_input(password_input);
        if registering() {
            runtime.dispatch_action(DesktopAction::ShowLogin);
        } else {
            runtime.dispatch_action(DesktopAction::ShowRegistration);
        }
    };
    let on_enter = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Enter" {
            ev.prevent_default();
            submit();
        }
    };

    view! {
        <div
            id="signin-overlay"
            class="modal-backdrop signin"
            style=move || if hidden() { "display:none;" } else { "" }
            on:contextmenu=move |ev: web_sys::MouseEvent| stop_mouse_event(&ev)
        >
            <div class="modal" role="dialog" aria-modal="true" aria-labelledby="signin-title">
                <h2 id="signin-title">
                    {move || if registering() { "Create account" } else { "Sign in" }}
                </h2>
                <Show
                    when=move || session() != SessionState::Checking
                    fallback=|| view! { <p class="signin-status">"Checking session..."</p> }
                >
                    <input
                        id="signin-username"
                        type="text"
                        placeholder="Username"
                        autocomplete="username"
                        node_ref=username_input
                        disabled=busy
                        on:keydown=on_enter
                    />
                    <input
                        id="signin-password"
                        type="password"
                        placeholder="Password"
                        autocomplete=move || {
                            if registering() { "new-password" } else { "current-password" }
                        }
                        node_ref=password_input
                        disabled=busy
                        on:keydown=on_enter
                    />
                    <input
                        id="signin-email"
                        type="email"
                        placeholder="Email"
                        autocomplete="email"
                        node_ref=email_input
                        disabled=busy
                        style=move || if registering() { "" } else { "display:none;" }
                        on:keydown=on_enter
                    />
                    <p class="form-error" role="alert">{move || session_error(&session())}</p>
                    <button type="button" class="primary" disabled=busy on:click=move |_| submit()>
                        {move || match session() {
                            SessionState::SigningIn => "Signing in...",
                            SessionState::SubmittingRegistration => "Creating account...",
                            SessionState::Registering { .. } => "Create account",
                            _ => "Sign in",
                        }}
                    </button>
                    <button type="button" class="link" disabled=busy on:click=toggle_mode>
                        {move || {
                            if registering() {
                                "Already have an account? Sign in"
                            } else {
                                "No account? Create one"
                            }
                        }}
                    </button>
                </Show>
            </div>
        </div>
    }
}

#[component]
pub(super) fn SessionBar() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let username = move || {
        runtime
            .state
            .with(|state| state.session.username().map(str::to_string))
    };

    move || {
        username().map(|username| {
            view! {
                <div class="session-bar" data-ui-slot="session-bar">
                    <span class="session-user">{username}</span>
                    <button
                        type="button"
                        on:click=move |ev: web_sys::MouseEvent| {
                            ev.stop_propagation();
                            runtime.dispatch_action(DesktopAction::Logout);
                        }
                    >
                        "Sign out"
                    </button>
                </div>
            }
        })
    }
}

#[component]
pub(super) fn NoticeBar() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let notice = move || runtime.state.with(|state| state.notice.clone());

    move || {
        notice().map(|message| {
            view! {
                <div class="notice-bar" role="status">
                    <span>{message}</span>
                    <button
                        type="button"
                        aria-label="Dismiss"
                        on:click=move |ev: web_sys::MouseEvent| {
                            ev.stop_propagation();
                            runtime.dispatch_action(DesktopAction::DismissNotice);
                        }
                    >
                        "x"
                    </button>
                </div>
            }
        })
    }
}
