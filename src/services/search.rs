use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{IndividualRoomSummary, SearchResults, SearchType, TeamSummary};
use crate::services::error::BookingResult;
use crate::services::finish;
use crate::services::team_room::describe;
use crate::store::{BookingStore, StoreTx};

/// Upper bound on the hits returned for each kind of record.
pub const RESULTS_PER_KIND: i64 = 10;

#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn BookingStore>,
}

impl SearchService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Free-text lookup across branches, rooms and teams. A blank query
    /// finds nothing; `kind` narrows the lookup to one family of records.
    pub async fn search(&self, text: &str, kind: Option<SearchType>) -> BookingResult<SearchResults> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SearchResults::default());
        }

        let mut tx = self.store.begin().await?;
        let result = search_in_tx(tx.as_mut(), text, kind).await;
        let results = finish(tx, result).await?;

        log::debug!(
            "Search for {:?} ({}) returned {} results",
            text,
            kind.map_or("ALL", |k| k.as_str()),
            results.total_results
        );
        Ok(results)
    }
}

fn wants(kind: Option<SearchType>, target: SearchType) -> bool {
    kind.is_none_or(|kind| kind.covers(target))
}

async fn search_in_tx(
    tx: &mut dyn StoreTx,
    text: &str,
    kind: Option<SearchType>,
) -> BookingResult<SearchResults> {
    let mut results = SearchResults::default();

    if wants(kind, SearchType::Branches) {
        results.branches = tx.search_branches(text, RESULTS_PER_KIND).await?;
    }

    if wants(kind, SearchType::IndividualRooms) {
        let rooms = tx.search_individual_rooms(text, RESULTS_PER_KIND).await?;
        let ids: Vec<Uuid> = rooms.iter().map(|r| r.id).collect();
        let counts = tx.participant_counts(&ids).await?;
        results.individual_rooms = rooms
            .into_iter()
            .map(|room| {
                let filled = counts.get(&room.id).copied().unwrap_or(0);
                IndividualRoomSummary::new(room, filled)
            })
            .collect();
    }

    if wants(kind, SearchType::TeamRooms) {
        let rooms = tx.search_team_rooms(text, RESULTS_PER_KIND).await?;
        results.team_rooms = describe(tx, rooms).await?;
    }

    if wants(kind, SearchType::Teams) {
        let teams = tx.search_teams(text, RESULTS_PER_KIND).await?;
        let ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();
        let counts = tx.team_member_counts(&ids).await?;
        results.teams = teams
            .into_iter()
            .map(|team| {
                let members = counts.get(&team.id).copied().unwrap_or(0);
                TeamSummary::new(team, members)
            })
            .collect();
    }

    results.total_results = results.branches.len()
        + results.individual_rooms.len()
        + results.team_rooms.len()
        + results.teams.len();
    Ok(results)
}
