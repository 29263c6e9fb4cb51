use actix_web::{get, web, HttpRequest};

use crate::api::{error, success};
use crate::middlewares::get_token;
use crate::modules::session::{model::TokenResponse, service::SessionManager};

#[get("/connect")]
pub async fn get_connect(
    sessions: web::Data<SessionManager>,
    req: HttpRequest,
) -> Result<success::Success<TokenResponse>, error::Error> {
    let authorization = req.headers().get("Authorization").and_then(|h| h.to_str().ok());
    let token = sessions.authenticate(authorization).await?;
    Ok(success::Success::ok(TokenResponse { token }))
}

#[get("/disconnect")]
pub async fn get_disconnect(
    sessions: web::Data<SessionManager>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let token = get_token(&req).ok_or(error::Error::Unauthorized)?;
    sessions.revoke(&token).await?;
    Ok(success::Success::no_content())
}
