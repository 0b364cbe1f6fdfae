use actix_web::web;

use crate::handlers::teams;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/teams")
            .route("", web::post().to(teams::create_team))
            .route("", web::get().to(teams::list_teams))
            // static segments before /{id}
            .route("/my-teams/captain", web::get().to(teams::my_teams_as_captain))
            .route("/my-teams/member", web::get().to(teams::my_teams_as_member))
            .route("/{id}", web::get().to(teams::get_team))
            .route("/{id}", web::put().to(teams::update_team))
            .route("/{id}", web::delete().to(teams::disband_team))
            .route("/{id}/members", web::post().to(teams::add_member))
            .route(
                "/{team_id}/members/{user_id}",
                web::delete().to(teams::remove_member),
            )
            .route(
                "/{id}/transfer-captain",
                web::post().to(teams::transfer_captain),
            ),
    );
}
