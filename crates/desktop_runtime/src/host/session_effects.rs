use leptos::logging;
use platform_host::{ApiError, LoginRequest, RegisterRequest};

use crate::{
    host::{DesktopHostContext, EffectDispatch},
    reducer::DesktopAction,
};

pub(super) async fn check_session(host: &DesktopHostContext, dispatch: EffectDispatch<'_>) {
    match host.session_service().current_session().await {
        Ok(session) => dispatch(DesktopAction::SessionStarted {
            username: session.user.username,
        }),
        Err(ApiError::Unauthorized) => dispatch(DesktopAction::SessionEnded { error: None }),
        Err(err) => {
            logging::warn!("session check failed: {err}");
            dispatch(DesktopAction::SessionEnded {
                error: Some(err.user_message()),
            });
        }
    }
}

pub(super) async fn login(
    host: &DesktopHostContext,
    request: LoginRequest,
    dispatch: EffectDispatch<'_>,
) {
    match host.session_service().login(&request).await {
        Ok(()) => dispatch(DesktopAction::SessionStarted {
            username: request.username,
        }),
        Err(err) => dispatch(DesktopAction::LoginFailed {
            message: err.user_message(),
        }),
    }
}

pub(super) async fn register(
    host: &DesktopHostContext,
    request: RegisterRequest,
    dispatch: EffectDispatch<'_>,
) {
    match host.session_service().register(&request).await {
        Ok(()) => dispatch(DesktopAction::Registered),
        Err(err) => {
            logging::warn!("registration of `{}` failed: {err}", request.username);
            dispatch(DesktopAction::RegistrationFailed {
                message: err.user_message(),
            });
        }
    }
}

pub(super) async fn logout(host: &DesktopHostContext) {
    if let Err(err) = host.session_service().logout().await {
        logging::warn!("logout failed: {err}");
    }
}

pub(super) async fn load_background(host: &DesktopHostContext, dispatch: EffectDispatch<'_>) {
    match host.session_service().load_background().await {
        Ok(preference) => dispatch(DesktopAction::BackgroundLoaded {
            url: preference.background_url,
        }),
        Err(err) => logging::warn!("background load failed: {err}"),
    }
}
