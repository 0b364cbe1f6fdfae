use actix_web::{
    HttpResponse,
    web::{Data, Json, Path, Query},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::Identity,
    database::models::{CreateTeamRoomInput, JoinTeamRoomInput, TeamRoomFilter},
    error::AppError,
    handlers::shared::{created, ok, page_request, optional_date, optional_status},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoomListQuery {
    pub branch_id: Option<Uuid>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub team_size: Option<i32>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

pub async fn create_room(
    state: Data<AppState>,
    identity: Identity,
    input: Json<CreateTeamRoomInput>,
) -> Result<HttpResponse, AppError> {
    let room = state
        .team_rooms
        .create_room(identity.user_id, input.into_inner())
        .await?;
    Ok(created(room, "Team room created successfully"))
}

pub async fn list_rooms(
    state: Data<AppState>,
    query: Query<TeamRoomListQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = TeamRoomFilter {
        branch_id: query.branch_id,
        date_from: optional_date(query.date_from.as_deref())?,
        date_to: optional_date(query.date_to.as_deref())?,
        team_size: query.team_size,
        status: optional_status(query.status.as_deref())?,
    };
    let page = state
        .team_rooms
        .list_rooms(filter, page_request(query.page, query.size))
        .await?;
    Ok(ok(page))
}

pub async fn get_room(state: Data<AppState>, path: Path<Uuid>) -> Result<HttpResponse, AppError> {
    let room = state.team_rooms.get_room(path.into_inner()).await?;
    Ok(ok(room))
}

pub async fn join_room(
    state: Data<AppState>,
    identity: Identity,
    path: Path<Uuid>,
    input: Json<JoinTeamRoomInput>,
) -> Result<HttpResponse, AppError> {
    let room = state
        .team_rooms
        .join_room(identity.user_id, path.into_inner(), input.team_id)
        .await?;
    Ok(ok(room))
}

pub async fn cancel_room(
    state: Data<AppState>,
    identity: Identity,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let room = state
        .team_rooms
        .cancel_room(identity.user_id, path.into_inner())
        .await?;
    Ok(ok(room))
}
