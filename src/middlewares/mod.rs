use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpMessage, HttpRequest,
};
use uuid::Uuid;

use crate::{api::error, modules::session::service::SessionManager};

/// Identity attached to the request once its `X-Token` session has resolved.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub Uuid);

pub fn get_token(req: &HttpRequest) -> Option<String> {
    req.headers().get("X-Token").and_then(|h| h.to_str().ok()).map(str::to_owned)
}

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let token = match get_token(req.request()) {
        Some(t) => t,
        None => {
            return Err(error::Error::Unauthorized.into());
        }
    };

    let Some(sessions) = req.app_data::<web::Data<SessionManager>>() else {
        log::error!("SessionManager missing from app data");
        return Err(error::Error::InternalServer.into());
    };

    let user_id = sessions.resolve(&token).await.map_err(error::Error::from)?;

    req.extensions_mut().insert(AuthUser(user_id));

    next.call(req).await
}

pub fn get_auth_user(req: &HttpRequest) -> Result<AuthUser, error::Error> {
    let extensions = req.extensions();

    let user = extensions.get::<AuthUser>().copied().ok_or(error::Error::Unauthorized)?;

    Ok(user)
}
