use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::api::{error, success};
use crate::middlewares::{get_auth_user, get_token};
use crate::modules::file::{model, service::FileService};
use crate::modules::session::service::SessionManager;
use crate::utils::{ValidatedJson, ValidatedQuery};

#[post("")]
pub async fn post_upload(
    file_service: web::Data<FileService>,
    req: HttpRequest,
    file_data: ValidatedJson<model::UploadModel>,
) -> Result<success::Success<model::FileResponse>, error::Error> {
    let owner = get_auth_user(&req)?.0;
    let file = file_service.upload(owner, file_data.0).await?;
    Ok(success::Success::created(file))
}

#[get("")]
pub async fn get_index(
    file_service: web::Data<FileService>,
    req: HttpRequest,
    query: ValidatedQuery<model::ListQuery>,
) -> Result<success::Success<Vec<model::FileResponse>>, error::Error> {
    let owner = get_auth_user(&req)?.0;
    let files = file_service.list(owner, query.0).await?;
    Ok(success::Success::ok(files))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_show(
    file_service: web::Data<FileService>,
    req: HttpRequest,
    file_id: web::Path<Uuid>,
) -> Result<success::Success<model::FileResponse>, error::Error> {
    let owner = get_auth_user(&req)?.0;
    let file = file_service.get(file_id.into_inner(), owner).await?;
    Ok(success::Success::ok(file))
}

#[put("/{id:[0-9a-fA-F-]{36}}/publish")]
pub async fn put_publish(
    file_service: web::Data<FileService>,
    req: HttpRequest,
    file_id: web::Path<Uuid>,
) -> Result<success::Success<model::FileResponse>, error::Error> {
    let owner = get_auth_user(&req)?.0;
    let file = file_service.set_visibility(file_id.into_inner(), owner, true).await?;
    Ok(success::Success::ok(file))
}

#[put("/{id:[0-9a-fA-F-]{36}}/unpublish")]
pub async fn put_unpublish(
    file_service: web::Data<FileService>,
    req: HttpRequest,
    file_id: web::Path<Uuid>,
) -> Result<success::Success<model::FileResponse>, error::Error> {
    let owner = get_auth_user(&req)?.0;
    let file = file_service.set_visibility(file_id.into_inner(), owner, false).await?;
    Ok(success::Success::ok(file))
}

/// Content download. Stays public: visibility is decided per record, and an
/// invalid token degrades to an anonymous read instead of failing.
#[get("/files/{id:[0-9a-fA-F-]{36}}/data")]
pub async fn get_data(
    file_service: web::Data<FileService>,
    sessions: web::Data<SessionManager>,
    req: HttpRequest,
    file_id: web::Path<Uuid>,
    query: ValidatedQuery<model::ReadQuery>,
) -> Result<HttpResponse, error::Error> {
    let requester = match get_token(&req) {
        Some(token) => sessions.try_resolve(&token).await,
        None => None,
    };

    let (bytes, mime) =
        file_service.read_content(file_id.into_inner(), requester, query.0.size).await?;

    Ok(HttpResponse::Ok().content_type(mime).body(bytes))
}
