use actix_web::{
    HttpResponse,
    web::{Data, Json, Path, Query},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::Identity,
    database::models::{CreateTeamInput, UpdateTeamInput},
    error::AppError,
    handlers::shared::{created, ok, page_request},
};

#[derive(Debug, Deserialize)]
pub struct TeamListQuery {
    pub name: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCaptainRequest {
    pub new_captain_id: Uuid,
}

pub async fn create_team(
    state: Data<AppState>,
    identity: Identity,
    input: Json<CreateTeamInput>,
) -> Result<HttpResponse, AppError> {
    let team = state
        .teams
        .create_team(identity.user_id, input.into_inner())
        .await?;
    Ok(created(team, "Team created successfully"))
}

pub async fn list_teams(
    state: Data<AppState>,
    query: Query<TeamListQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let page = state
        .teams
        .list_teams(query.name, page_request(query.page, query.size))
        .await?;
    Ok(ok(page))
}

pub async fn get_team(state: Data<AppState>, path: Path<Uuid>) -> Result<HttpResponse, AppError> {
    let team = state.teams.get_team(path.into_inner()).await?;
    Ok(ok(team))
}

pub async fn my_teams_as_captain(
    state: Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    let teams = state.teams.my_teams_as_captain(identity.user_id).await?;
    Ok(ok(teams))
}

pub async fn my_teams_as_member(
    state: Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, AppError> {
    let teams = state.teams.my_teams_as_member(identity.user_id).await?;
    Ok(ok(teams))
}

pub async fn update_team(
    state: Data<AppState>,
    identity: Identity,
    path: Path<Uuid>,
    input: Json<UpdateTeamInput>,
) -> Result<HttpResponse, AppError> {
    let team = state
        .teams
        .update_team(identity.user_id, path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(team))
}

pub async fn add_member(
    state: Data<AppState>,
    identity: Identity,
    path: Path<Uuid>,
    input: Json<AddMemberRequest>,
) -> Result<HttpResponse, AppError> {
    let team = state
        .teams
        .add_member(identity.user_id, path.into_inner(), input.user_id)
        .await?;
    Ok(ok(team))
}

pub async fn remove_member(
    state: Data<AppState>,
    identity: Identity,
    path: Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (team_id, user_id) = path.into_inner();
    let team = state
        .teams
        .remove_member(identity.user_id, team_id, user_id)
        .await?;
    Ok(ok(team))
}

pub async fn transfer_captain(
    state: Data<AppState>,
    identity: Identity,
    path: Path<Uuid>,
    input: Json<TransferCaptainRequest>,
) -> Result<HttpResponse, AppError> {
    let team = state
        .teams
        .transfer_captain(identity.user_id, path.into_inner(), input.new_captain_id)
        .await?;
    Ok(ok(team))
}

pub async fn disband_team(
    state: Data<AppState>,
    identity: Identity,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let team = state
        .teams
        .disband_team(identity.user_id, path.into_inner())
        .await?;
    Ok(ok(team))
}
