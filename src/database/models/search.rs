use serde::{Deserialize, Serialize};

use super::macros::string_enum;
use super::{Branch, IndividualRoomSummary, TeamRoomDetail, TeamSummary};

string_enum! {
    /// Narrows a search to one kind of record. `ROOMS` covers both room kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum SearchType {
        Branches => "BRANCHES",
        Rooms => "ROOMS",
        IndividualRooms => "INDIVIDUAL_ROOMS",
        TeamRooms => "TEAM_ROOMS",
        Teams => "TEAMS",
    }
}

impl SearchType {
    pub fn covers(&self, other: SearchType) -> bool {
        match self {
            SearchType::Rooms => matches!(
                other,
                SearchType::Rooms | SearchType::IndividualRooms | SearchType::TeamRooms
            ),
            _ => *self == other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub branches: Vec<Branch>,
    pub individual_rooms: Vec<IndividualRoomSummary>,
    pub team_rooms: Vec<TeamRoomDetail>,
    pub teams: Vec<TeamSummary>,
    pub total_results: usize,
}
