use actix_web::web;

use crate::handlers::search;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/search").route("", web::get().to(search::search)));
}
