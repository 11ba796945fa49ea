//! Desktop shortcut persistence on top of the injected [`DesktopItemsService`].
//!
//! These helpers translate between runtime icons and the REST wire records. Callers own the
//! recovery policy; this module only reports what the backend said.

use leptos::logging;
use platform_host::{ApiError, CreateDesktopItemRequest, DesktopItemPatch, DesktopItemsService};

use crate::{
    config::icon_config,
    model::{DesktopIcon, IconId, IconPosition},
};

/// Fetches the full icon list in server order.
pub async fn load_icons(service: &dyn DesktopItemsService) -> Result<Vec<DesktopIcon>, ApiError> {
    let sizing = &icon_config().icon;
    let list = service.list_items().await?;
    for reason in &list.skipped {
        logging::warn!("skipping undecodable desktop item {reason}");
    }
    Ok(list
        .items
        .into_iter()
        .map(|record| DesktopIcon::from_record(record, sizing))
        .collect())
}

/// Creates a shortcut and returns its server-assigned id.
pub async fn create_icon(
    service: &dyn DesktopItemsService,
    request: &CreateDesktopItemRequest,
) -> Result<IconId, ApiError> {
    let response = service.create_item(request).await?;
    Ok(IconId(response.id))
}

pub async fn save_icon_position(
    service: &dyn DesktopItemsService,
    icon_id: &IconId,
    position: IconPosition,
) -> Result<(), ApiError> {
    let patch = DesktopItemPatch::position(position.x, position.y);
    service.update_item(icon_id.as_str(), &patch).await?;
    Ok(())
}

/// Persists a square image size together with the icon's position.
pub async fn save_icon_geometry(
    service: &dyn DesktopItemsService,
    icon_id: &IconId,
    position: IconPosition,
    size: i32,
) -> Result<(), ApiError> {
    let patch = DesktopItemPatch {
        width: Some(size),
        height: Some(size),
        ..DesktopItemPatch::position(position.x, position.y)
    };
    service.update_item(icon_id.as_str(), &patch).await?;
    Ok(())
}

pub async fn save_icon_image(
    service: &dyn DesktopItemsService,
    icon_id: &IconId,
    image: &str,
) -> Result<(), ApiError> {
    service
        .update_item(icon_id.as_str(), &DesktopItemPatch::image(image))
        .await?;
    Ok(())
}

pub async fn delete_icon(
    service: &dyn DesktopItemsService,
    icon_id: &IconId,
) -> Result<(), ApiError> {
    service.delete_item(icon_id.as_str()).await?;
    Ok(())
}

/// Persists grid placements one icon at a time, in order.
///
/// A failed icon is logged and skipped. Returns the number of failed icons.
///
/// # Errors
///
/// Stops at the first [`ApiError::Unauthorized`], since every later request would fail too.
pub async fn save_arrangement(
    service: &dyn DesktopItemsService,
    placements: &[(IconId, IconPosition)],
) -> Result<usize, ApiError> {
    let mut failed = 0;
    for (icon_id, position) in placements {
        match save_icon_position(service, icon_id, *position).await {
            Ok(()) => {}
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
            Err(err) => {
                logging::warn!("auto arrange: saving position of icon {icon_id} failed: {err}");
                failed += 1;
            }
        }
    }
    Ok(failed)
}
