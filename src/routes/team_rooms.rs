use actix_web::web;

use crate::handlers::team_rooms;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rooms/team")
            .route("", web::post().to(team_rooms::create_room))
            .route("", web::get().to(team_rooms::list_rooms))
            .route("/{id}", web::get().to(team_rooms::get_room))
            .route("/{id}", web::delete().to(team_rooms::cancel_room))
            .route("/{id}/join", web::post().to(team_rooms::join_room)),
    );
}
