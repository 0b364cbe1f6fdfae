use actix_web::{
    HttpResponse,
    web::{Data, Query},
};
use serde::Deserialize;

use crate::{
    AppState,
    database::models::SearchType,
    error::AppError,
    handlers::shared::ok,
    services::BookingError,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub async fn search(
    state: Data<AppState>,
    query: Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let kind = query
        .kind
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<SearchType>()
                .map_err(|_| BookingError::InvalidSearchType(v.to_string()))
        })
        .transpose()?;

    let results = state
        .search
        .search(query.query.as_deref().unwrap_or_default(), kind)
        .await?;
    Ok(ok(results))
}
