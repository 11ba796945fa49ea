//! Explicit runtime effect-queue executor for reducer-emitted side effects.

use leptos::*;

use crate::{reducer::DesktopAction, runtime_context::DesktopRuntimeContext};

/// Installs the effect executor that drains reducer-emitted runtime effects in order.
///
/// Each effect runs as its own task, so independent persistence calls never wait on each other.
pub fn install(runtime: DesktopRuntimeContext) {
    // Clear the current queue before processing so nested dispatches enqueue a fresh batch instead
    // of being overwritten by the in-flight drain.
    create_effect(move |_| {
        let queued = runtime.effects.get();
        if queued.is_empty() {
            return;
        }

        runtime.effects.set(Vec::new());

        for effect in queued {
            let host = runtime.host.get_value();
            spawn_local(async move {
                host.run_runtime_effect(effect, &|action: DesktopAction| {
                    runtime.dispatch_action(action)
                })
                .await;
            });
        }
    });
}
