use actix_web::{get, post, web, HttpRequest};

use crate::middlewares::get_auth_user;
use crate::modules::user::{model, service::UserService};
use crate::{
    api::{error, success},
    utils::ValidatedJson,
};

#[post("")]
pub async fn post_new(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::RegisterModel>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = user_service.register(user_data.0).await?;
    Ok(success::Success::created(user))
}

#[get("/me")]
pub async fn get_me(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_auth_user(&req)?.0;
    let user = user_service.me(id).await?;
    Ok(success::Success::ok(user))
}
