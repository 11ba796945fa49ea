use leptos::logging;

use crate::{
    config::icon_config,
    host::{DesktopHostContext, EffectDispatch},
    layout::SurfaceSize,
    model::IconId,
    reducer::DesktopAction,
};

pub(super) async fn open_external_url(host: &DesktopHostContext, url: &str) {
    if let Err(err) = host.external_url_service().open_url(url).await {
        logging::warn!("open external url failed for `{url}`: {err}");
    }
}

pub(super) async fn pick_icon_image(
    host: &DesktopHostContext,
    icon_id: IconId,
    dispatch: EffectDispatch<'_>,
) {
    let max_bytes = icon_config().upload.max_image_bytes;
    match host.icon_image_picker().pick_icon_image(max_bytes).await {
        Ok(Some(image)) => dispatch(DesktopAction::IconImagePicked { icon_id, image }),
        Ok(None) => {}
        Err(err) => logging::warn!("icon image picker failed for icon {icon_id}: {err}"),
    }
}

pub(super) fn desktop_surface_size() -> SurfaceSize {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let width = window
                .inner_width()
                .ok()
                .and_then(|value| value.as_f64())
                .map(|value| value as i32)
                .unwrap_or(1024);
            let height = window
                .inner_height()
                .ok()
                .and_then(|value| value.as_f64())
                .map(|value| value as i32)
                .unwrap_or(768);

            return SurfaceSize::new(width.max(1), height.max(1));
        }
    }

    SurfaceSize::default()
}
