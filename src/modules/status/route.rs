use crate::modules::status::handle::*;
use actix_web::web::ServiceConfig;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_status).service(get_stats);
}
