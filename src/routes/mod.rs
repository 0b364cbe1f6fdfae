use actix_web::web;

pub mod bookings;
pub mod branches;
pub mod individual_rooms;
pub mod search;
pub mod team_rooms;
pub mod teams;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(branches::configure)
            .configure(individual_rooms::configure)
            .configure(team_rooms::configure)
            .configure(teams::configure)
            .configure(bookings::configure)
            .configure(search::configure),
    );
}
