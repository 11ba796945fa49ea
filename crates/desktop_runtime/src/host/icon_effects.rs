use leptos::logging;
use platform_host::{ApiError, CreateDesktopItemRequest};

use crate::{
    host::{DesktopHostContext, EffectDispatch},
    model::{CommandTicket, IconId, IconPosition},
    persistence,
    reducer::DesktopAction,
};

pub(super) async fn load_icons(
    host: &DesktopHostContext,
    ticket: Option<CommandTicket>,
    dispatch: EffectDispatch<'_>,
) {
    let result = persistence::load_icons(host.desktop_items_service().as_ref()).await;
    if let Err(err) = &result {
        match ticket {
            Some(ticket) => logging::warn!("resync after failed command {ticket:?} failed: {err}"),
            None => logging::warn!("loading desktop icons failed: {err}"),
        }
    }
    dispatch(DesktopAction::IconsLoaded { ticket, result });
}

pub(super) async fn create_icon(
    host: &DesktopHostContext,
    ticket: CommandTicket,
    request: CreateDesktopItemRequest,
    dispatch: EffectDispatch<'_>,
) {
    let result = persistence::create_icon(host.desktop_items_service().as_ref(), &request)
        .await
        .map(|icon_id| logging::log!("created desktop shortcut {icon_id}"));
    report(ticket, "create shortcut", result, dispatch);
}

pub(super) async fn persist_position(
    host: &DesktopHostContext,
    ticket: CommandTicket,
    icon_id: IconId,
    position: IconPosition,
    dispatch: EffectDispatch<'_>,
) {
    let result =
        persistence::save_icon_position(host.desktop_items_service().as_ref(), &icon_id, position)
            .await;
    report(ticket, "save icon position", result, dispatch);
}

pub(super) async fn persist_geometry(
    host: &DesktopHostContext,
    ticket: CommandTicket,
    icon_id: IconId,
    position: IconPosition,
    size: i32,
    dispatch: EffectDispatch<'_>,
) {
    let result = persistence::save_icon_geometry(
        host.desktop_items_service().as_ref(),
        &icon_id,
        position,
        size,
    )
    .await;
    report(ticket, "resize icon", result, dispatch);
}

pub(super) async fn persist_image(
    host: &DesktopHostContext,
    ticket: CommandTicket,
    icon_id: IconId,
    image: String,
    dispatch: EffectDispatch<'_>,
) {
    let result =
        persistence::save_icon_image(host.desktop_items_service().as_ref(), &icon_id, &image)
            .await;
    report(ticket, "change icon image", result, dispatch);
}

pub(super) async fn delete_icon(
    host: &DesktopHostContext,
    ticket: CommandTicket,
    icon_id: IconId,
    dispatch: EffectDispatch<'_>,
) {
    let result = persistence::delete_icon(host.desktop_items_service().as_ref(), &icon_id).await;
    report(ticket, "delete icon", result, dispatch);
}

pub(super) async fn persist_arrangement(
    host: &DesktopHostContext,
    ticket: CommandTicket,
    placements: Vec<(IconId, IconPosition)>,
    dispatch: EffectDispatch<'_>,
) {
    let result =
        persistence::save_arrangement(host.desktop_items_service().as_ref(), &placements)
            .await
            .map(|failed| {
                if failed > 0 {
                    logging::warn!(
                        "auto arrange saved {} of {} icons",
                        placements.len() - failed,
                        placements.len()
                    );
                }
            });
    report(ticket, "auto arrange", result, dispatch);
}

fn report(
    ticket: CommandTicket,
    what: &str,
    result: Result<(), ApiError>,
    dispatch: EffectDispatch<'_>,
) {
    match result {
        Ok(()) => dispatch(DesktopAction::CommandSucceeded { ticket }),
        Err(error) => {
            logging::warn!("{what} failed: {error}");
            dispatch(DesktopAction::CommandFailed { ticket, error });
        }
    }
}
