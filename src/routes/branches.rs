use actix_web::web;

use crate::handlers::branches;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/branches")
            .route("", web::post().to(branches::create_branch))
            .route("", web::get().to(branches::list_branches))
            .route("/{id}", web::get().to(branches::get_branch))
            .route("/{id}", web::put().to(branches::update_branch))
            .route("/{id}", web::delete().to(branches::deactivate_branch)),
    );
}
