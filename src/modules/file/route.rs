use crate::modules::file::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(get_data);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/files")
            .service(post_upload)
            .service(get_index)
            .service(get_show)
            .service(put_publish)
            .service(put_unpublish),
    );
}
