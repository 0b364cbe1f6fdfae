use actix_web::web;

use crate::handlers::bookings;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("/my-bookings", web::get().to(bookings::my_bookings))
            .route(
                "/my-bookings/upcoming",
                web::get().to(bookings::my_upcoming_bookings),
            )
            .route("/my-bookings/past", web::get().to(bookings::my_past_bookings)),
    );
}
