use actix_web::{
    HttpResponse,
    web::{Data, Json, Path, Query},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::Identity,
    database::models::{CreateIndividualRoomInput, RoomFilter},
    error::AppError,
    handlers::shared::{created, ok, page_request, optional_date, optional_status},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomListQuery {
    pub branch_id: Option<Uuid>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl RoomListQuery {
    fn filter(&self) -> Result<RoomFilter, AppError> {
        Ok(RoomFilter {
            branch_id: self.branch_id,
            date_from: optional_date(self.date_from.as_deref())?,
            date_to: optional_date(self.date_to.as_deref())?,
            status: optional_status(self.status.as_deref())?,
        })
    }
}

pub async fn create_room(
    state: Data<AppState>,
    identity: Identity,
    input: Json<CreateIndividualRoomInput>,
) -> Result<HttpResponse, AppError> {
    let room = state
        .individual_rooms
        .create_room(identity.user_id, input.into_inner())
        .await?;
    Ok(created(room, "Room created successfully"))
}

pub async fn list_rooms(
    state: Data<AppState>,
    query: Query<RoomListQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = query.filter()?;
    let page = state
        .individual_rooms
        .list_rooms(filter, page_request(query.page, query.size))
        .await?;
    Ok(ok(page))
}

pub async fn get_room(state: Data<AppState>, path: Path<Uuid>) -> Result<HttpResponse, AppError> {
    let room = state.individual_rooms.get_room(path.into_inner()).await?;
    Ok(ok(room))
}

pub async fn join_room(
    state: Data<AppState>,
    identity: Identity,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let room = state
        .individual_rooms
        .join_room(identity.user_id, path.into_inner())
        .await?;
    Ok(ok(room))
}

pub async fn leave_room(
    state: Data<AppState>,
    identity: Identity,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let room = state
        .individual_rooms
        .leave_room(identity.user_id, path.into_inner())
        .await?;
    Ok(ok(room))
}

pub async fn cancel_room(
    state: Data<AppState>,
    identity: Identity,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let room = state
        .individual_rooms
        .cancel_room(identity.user_id, path.into_inner())
        .await?;
    Ok(ok(room))
}
