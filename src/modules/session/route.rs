use crate::modules::session::handle::*;
use actix_web::web::ServiceConfig;

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(get_connect);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_disconnect);
}
