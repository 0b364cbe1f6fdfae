use actix_web::{HttpResponse, web::Data};

use crate::{
    AppState, auth::Identity, database::models::BookingScope, error::AppError,
    handlers::shared::ok,
};

async fn bookings(
    state: &AppState,
    identity: Identity,
    scope: BookingScope,
) -> Result<HttpResponse, AppError> {
    let bookings = state.bookings.get_bookings(identity.user_id, scope).await?;
    Ok(ok(bookings))
}

pub async fn my_bookings(state: Data<AppState>, identity: Identity) -> Result<HttpResponse, AppError> {
    bookings(&state, identity, BookingScope::All).await
}

pub async fn my_upcoming_bookings(
    state: Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    bookings(&state, identity, BookingScope::Upcoming).await
}

pub async fn my_past_bookings(
    state: Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    bookings(&state, identity, BookingScope::Past).await
}
