//! Data-access port for the booking core.
//!
//! Every engine operation opens one [`StoreTx`], performs its
//! read → validate → write sequence inside it and commits only when every
//! rule passed. The `lock_*` reads are the serialization points: a
//! transaction holding a room or team lock is the only one allowed to change
//! that aggregate's head count or match state until it finishes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    Branch, IndividualRoom, PageRequest, Participant, RoomFilter, Team, TeamMember, TeamRoom,
    TeamRoomFilter, UserSummary,
};

pub mod memory;

pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BookingStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;
}

#[async_trait]
pub trait StoreTx: Send {
    async fn commit(self: Box<Self>) -> StoreResult<()>;
    async fn rollback(self: Box<Self>) -> StoreResult<()>;

    async fn user_exists(&mut self, user_id: Uuid) -> StoreResult<bool>;
    async fn find_users(&mut self, ids: &[Uuid]) -> StoreResult<Vec<UserSummary>>;

    async fn insert_branch(&mut self, branch: &Branch) -> StoreResult<()>;
    async fn update_branch(&mut self, branch: &Branch) -> StoreResult<()>;
    async fn find_branch(&mut self, id: Uuid) -> StoreResult<Option<Branch>>;
    async fn find_branches(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Branch>>;
    /// Active branches ordered by name, optionally filtered by a
    /// case-insensitive name fragment.
    async fn list_active_branches(
        &mut self,
        name: Option<&str>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Branch>, i64)>;

    async fn insert_individual_room(&mut self, room: &IndividualRoom) -> StoreResult<()>;
    async fn update_individual_room(&mut self, room: &IndividualRoom) -> StoreResult<()>;
    async fn find_individual_room(&mut self, id: Uuid) -> StoreResult<Option<IndividualRoom>>;
    async fn lock_individual_room(&mut self, id: Uuid) -> StoreResult<Option<IndividualRoom>>;
    /// Non-cancelled rooms matching `filter`, ordered by date then start.
    async fn list_individual_rooms(
        &mut self,
        filter: &RoomFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<IndividualRoom>, i64)>;
    /// Every room the user has a participant row in, whatever its status.
    async fn individual_rooms_of_user(&mut self, user_id: Uuid) -> StoreResult<Vec<IndividualRoom>>;
    /// Non-cancelled rooms on `date` in which any of `user_ids` participates.
    async fn individual_bookings_on(
        &mut self,
        user_ids: &[Uuid],
        date: NaiveDate,
    ) -> StoreResult<Vec<IndividualRoom>>;

    async fn insert_participant(&mut self, participant: &Participant) -> StoreResult<()>;
    async fn delete_participant(&mut self, room_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    async fn is_participant(&mut self, room_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    async fn count_participants(&mut self, room_id: Uuid) -> StoreResult<i64>;
    /// Ordered by `joined_at`.
    async fn list_participants(&mut self, room_id: Uuid) -> StoreResult<Vec<Participant>>;
    async fn participant_counts(&mut self, room_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>>;

    async fn insert_team(&mut self, team: &Team) -> StoreResult<()>;
    async fn update_team(&mut self, team: &Team) -> StoreResult<()>;
    async fn find_team(&mut self, id: Uuid) -> StoreResult<Option<Team>>;
    async fn lock_team(&mut self, id: Uuid) -> StoreResult<Option<Team>>;
    async fn find_teams(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Team>>;
    async fn list_active_teams(
        &mut self,
        name: Option<&str>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Team>, i64)>;
    /// Active teams led by the user, newest first.
    async fn teams_captained_by(&mut self, user_id: Uuid) -> StoreResult<Vec<Team>>;
    /// Active teams the user belongs to, ordered by name.
    async fn teams_of_member(&mut self, user_id: Uuid) -> StoreResult<Vec<Team>>;
    /// Ids of every team the user belongs to, disbanded teams included.
    async fn team_ids_of_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Uuid>>;

    async fn insert_team_member(&mut self, member: &TeamMember) -> StoreResult<()>;
    async fn delete_team_member(&mut self, team_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    async fn is_team_member(&mut self, team_id: Uuid, user_id: Uuid) -> StoreResult<bool>;
    async fn count_team_members(&mut self, team_id: Uuid) -> StoreResult<i64>;
    /// Ordered by `joined_at`.
    async fn list_team_members(&mut self, team_id: Uuid) -> StoreResult<Vec<TeamMember>>;
    async fn team_member_counts(&mut self, team_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>>;

    async fn insert_team_room(&mut self, room: &TeamRoom) -> StoreResult<()>;
    async fn update_team_room(&mut self, room: &TeamRoom) -> StoreResult<()>;
    async fn find_team_room(&mut self, id: Uuid) -> StoreResult<Option<TeamRoom>>;
    async fn lock_team_room(&mut self, id: Uuid) -> StoreResult<Option<TeamRoom>>;
    async fn list_team_rooms(
        &mut self,
        filter: &TeamRoomFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<TeamRoom>, i64)>;
    /// Rooms any of the teams created or joined, whatever their status.
    async fn team_rooms_of_teams(&mut self, team_ids: &[Uuid]) -> StoreResult<Vec<TeamRoom>>;
    /// Non-cancelled rooms on `date` the team created or joined.
    async fn team_bookings_on(&mut self, team_id: Uuid, date: NaiveDate)
    -> StoreResult<Vec<TeamRoom>>;

    // Free-text lookups. `text` is matched case-insensitively as a substring.

    /// Active branches whose name or address contains `text`, by name.
    async fn search_branches(&mut self, text: &str, limit: i64) -> StoreResult<Vec<Branch>>;
    /// Non-cancelled rooms whose branch name, owner name or notes contain
    /// `text`, by date then start.
    async fn search_individual_rooms(
        &mut self,
        text: &str,
        limit: i64,
    ) -> StoreResult<Vec<IndividualRoom>>;
    /// Non-cancelled rooms whose branch or either team's name contains
    /// `text`, by date then start.
    async fn search_team_rooms(&mut self, text: &str, limit: i64) -> StoreResult<Vec<TeamRoom>>;
    /// Active teams whose name or description contains `text`, by name.
    async fn search_teams(&mut self, text: &str, limit: i64) -> StoreResult<Vec<Team>>;
}
