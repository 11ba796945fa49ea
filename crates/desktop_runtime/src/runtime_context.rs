//! Runtime provider and context wiring for the desktop shell.
//!
//! This module owns the long-lived reducer container, the runtime effect queue, and host boot
//! wiring. UI composition stays in [`crate::components`].

use leptos::*;
use platform_host::HostServices;

use crate::{
    effect_executor,
    host::DesktopHostContext,
    model::{DesktopState, InteractionState},
    reducer::{reduce_desktop, DesktopAction, RuntimeEffect},
};

#[derive(Clone, Copy)]
/// Leptos context for reading desktop runtime state and dispatching [`DesktopAction`] values.
pub struct DesktopRuntimeContext {
    /// Host service bundle for executing runtime side effects and environment queries.
    pub host: StoredValue<DesktopHostContext>,
    /// Reactive desktop state signal.
    pub state: RwSignal<DesktopState>,
    /// Reactive pointer/drag interaction state signal.
    pub interaction: RwSignal<InteractionState>,
    /// Queue of runtime effects emitted by the reducer and processed by the executor.
    pub effects: RwSignal<Vec<RuntimeEffect>>,
    /// Reducer dispatch callback.
    pub dispatch: Callback<DesktopAction>,
}

impl DesktopRuntimeContext {
    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: DesktopAction) {
        self.dispatch.call(action);
    }
}

#[component]
/// Provides [`DesktopRuntimeContext`] to descendant components and boots the session.
pub fn DesktopProvider(
    /// Injected browser or stub host bundle assembled by the entry layer.
    host_services: HostServices,
    children: Children,
) -> impl IntoView {
    let host = store_value(DesktopHostContext::new(host_services));
    let state = create_rw_signal(DesktopState::default());
    let interaction = create_rw_signal(InteractionState::default());
    let effects = create_rw_signal(Vec::<RuntimeEffect>::new());

    let dispatch = Callback::new(move |action: DesktopAction| {
        let mut desktop = state.get_untracked();
        let mut ui = interaction.get_untracked();
        let previous_desktop = desktop.clone();
        let previous_ui = ui.clone();

        match reduce_desktop(&mut desktop, &mut ui, action) {
            Ok(new_effects) => {
                if desktop != previous_desktop {
                    state.set(desktop);
                }
                if ui != previous_ui {
                    interaction.set(ui);
                }
                if !new_effects.is_empty() {
                    let mut queue = effects.get_untracked();
                    queue.extend(new_effects);
                    effects.set(queue);
                }
            }
            Err(err) => logging::warn!("desktop reducer error: {err}"),
        }
    });

    let runtime = DesktopRuntimeContext {
        host,
        state,
        interaction,
        effects,
        dispatch,
    };

    provide_context(runtime);

    effect_executor::install(runtime);
    logging::log!(
        "desktop runtime using {} host",
        host.with_value(|host| host.host_strategy_name())
    );
    runtime.dispatch_action(DesktopAction::Boot);

    children().into_view()
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DesktopProvider`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}
