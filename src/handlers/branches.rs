use actix_web::{
    HttpResponse,
    web::{Data, Json, Path, Query},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::Identity,
    database::models::{CreateBranchInput, UpdateBranchInput},
    error::AppError,
    handlers::shared::{created, ok, page_request},
};

#[derive(Debug, Deserialize)]
pub struct BranchListQuery {
    pub name: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

pub async fn create_branch(
    state: Data<AppState>,
    identity: Identity,
    input: Json<CreateBranchInput>,
) -> Result<HttpResponse, AppError> {
    let branch = state.branches.create_branch(input.into_inner()).await?;
    log::info!("Branch {} created by {}", branch.id, identity.user_id);
    Ok(created(branch, "Branch created successfully"))
}

pub async fn list_branches(
    state: Data<AppState>,
    query: Query<BranchListQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let page = state
        .branches
        .list_branches(query.name, page_request(query.page, query.size))
        .await?;
    Ok(ok(page))
}

pub async fn get_branch(state: Data<AppState>, path: Path<Uuid>) -> Result<HttpResponse, AppError> {
    let branch = state.branches.get_branch(path.into_inner()).await?;
    Ok(ok(branch))
}

pub async fn update_branch(
    state: Data<AppState>,
    _identity: Identity,
    path: Path<Uuid>,
    input: Json<UpdateBranchInput>,
) -> Result<HttpResponse, AppError> {
    let branch = state
        .branches
        .update_branch(path.into_inner(), input.into_inner())
        .await?;
    Ok(ok(branch))
}

pub async fn deactivate_branch(
    state: Data<AppState>,
    _identity: Identity,
    path: Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let branch = state.branches.deactivate_branch(path.into_inner()).await?;
    Ok(ok(branch))
}
