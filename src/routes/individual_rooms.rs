use actix_web::web;

use crate::handlers::individual_rooms;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rooms/individual")
            .route("", web::post().to(individual_rooms::create_room))
            .route("", web::get().to(individual_rooms::list_rooms))
            .route("/{id}", web::get().to(individual_rooms::get_room))
            .route("/{id}", web::delete().to(individual_rooms::cancel_room))
            .route("/{id}/join", web::post().to(individual_rooms::join_room))
            .route("/{id}/leave", web::delete().to(individual_rooms::leave_room)),
    );
}
