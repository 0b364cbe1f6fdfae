use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{
    Branch, IndividualRoom, PageRequest, Participant, RoomFilter, Team, TeamMember, TeamRoom,
    TeamRoomFilter, UserSummary,
};
use crate::database::repositories::{branch, individual_room, team, team_room, user};
use crate::store::{BookingStore, StoreResult, StoreTx};

/// Postgres-backed store. Each engine transaction maps onto one database
/// transaction and the `lock_*` reads take `FOR UPDATE` row locks.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }

    async fn user_exists(&mut self, user_id: Uuid) -> StoreResult<bool> {
        Ok(user::user_exists(&mut self.tx, user_id).await?)
    }

    async fn find_users(&mut self, ids: &[Uuid]) -> StoreResult<Vec<UserSummary>> {
        Ok(user::find_users(&mut self.tx, ids).await?)
    }

    async fn insert_branch(&mut self, value: &Branch) -> StoreResult<()> {
        Ok(branch::insert_branch(&mut self.tx, value).await?)
    }

    async fn update_branch(&mut self, value: &Branch) -> StoreResult<()> {
        Ok(branch::update_branch(&mut self.tx, value).await?)
    }

    async fn find_branch(&mut self, id: Uuid) -> StoreResult<Option<Branch>> {
        Ok(branch::find_branch(&mut self.tx, id).await?)
    }

    async fn find_branches(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Branch>> {
        Ok(branch::find_branches(&mut self.tx, ids).await?)
    }

    async fn list_active_branches(
        &mut self,
        name: Option<&str>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Branch>, i64)> {
        Ok(branch::list_active_branches(&mut self.tx, name, page).await?)
    }

    async fn insert_individual_room(&mut self, room: &IndividualRoom) -> StoreResult<()> {
        Ok(individual_room::insert_room(&mut self.tx, room).await?)
    }

    async fn update_individual_room(&mut self, room: &IndividualRoom) -> StoreResult<()> {
        Ok(individual_room::update_room(&mut self.tx, room).await?)
    }

    async fn find_individual_room(&mut self, id: Uuid) -> StoreResult<Option<IndividualRoom>> {
        Ok(individual_room::find_room(&mut self.tx, id).await?)
    }

    async fn lock_individual_room(&mut self, id: Uuid) -> StoreResult<Option<IndividualRoom>> {
        Ok(individual_room::lock_room(&mut self.tx, id).await?)
    }

    async fn list_individual_rooms(
        &mut self,
        filter: &RoomFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<IndividualRoom>, i64)> {
        Ok(individual_room::list_rooms(&mut self.tx, filter, page).await?)
    }

    async fn individual_rooms_of_user(&mut self, user_id: Uuid) -> StoreResult<Vec<IndividualRoom>> {
        Ok(individual_room::rooms_of_user(&mut self.tx, user_id).await?)
    }

    async fn individual_bookings_on(
        &mut self,
        user_ids: &[Uuid],
        date: NaiveDate,
    ) -> StoreResult<Vec<IndividualRoom>> {
        Ok(individual_room::bookings_on(&mut self.tx, user_ids, date).await?)
    }

    async fn insert_participant(&mut self, participant: &Participant) -> StoreResult<()> {
        Ok(individual_room::insert_participant(&mut self.tx, participant).await?)
    }

    async fn delete_participant(&mut self, room_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(individual_room::delete_participant(&mut self.tx, room_id, user_id).await?)
    }

    async fn is_participant(&mut self, room_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(individual_room::is_participant(&mut self.tx, room_id, user_id).await?)
    }

    async fn count_participants(&mut self, room_id: Uuid) -> StoreResult<i64> {
        Ok(individual_room::count_participants(&mut self.tx, room_id).await?)
    }

    async fn list_participants(&mut self, room_id: Uuid) -> StoreResult<Vec<Participant>> {
        Ok(individual_room::list_participants(&mut self.tx, room_id).await?)
    }

    async fn participant_counts(&mut self, room_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        Ok(individual_room::participant_counts(&mut self.tx, room_ids).await?)
    }

    async fn insert_team(&mut self, value: &Team) -> StoreResult<()> {
        Ok(team::insert_team(&mut self.tx, value).await?)
    }

    async fn update_team(&mut self, value: &Team) -> StoreResult<()> {
        Ok(team::update_team(&mut self.tx, value).await?)
    }

    async fn find_team(&mut self, id: Uuid) -> StoreResult<Option<Team>> {
        Ok(team::find_team(&mut self.tx, id).await?)
    }

    async fn lock_team(&mut self, id: Uuid) -> StoreResult<Option<Team>> {
        Ok(team::lock_team(&mut self.tx, id).await?)
    }

    async fn find_teams(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Team>> {
        Ok(team::find_teams(&mut self.tx, ids).await?)
    }

    async fn list_active_teams(
        &mut self,
        name: Option<&str>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Team>, i64)> {
        Ok(team::list_active_teams(&mut self.tx, name, page).await?)
    }

    async fn teams_captained_by(&mut self, user_id: Uuid) -> StoreResult<Vec<Team>> {
        Ok(team::teams_captained_by(&mut self.tx, user_id).await?)
    }

    async fn teams_of_member(&mut self, user_id: Uuid) -> StoreResult<Vec<Team>> {
        Ok(team::teams_of_member(&mut self.tx, user_id).await?)
    }

    async fn team_ids_of_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(team::team_ids_of_user(&mut self.tx, user_id).await?)
    }

    async fn insert_team_member(&mut self, member: &TeamMember) -> StoreResult<()> {
        Ok(team::insert_member(&mut self.tx, member).await?)
    }

    async fn delete_team_member(&mut self, team_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(team::delete_member(&mut self.tx, team_id, user_id).await?)
    }

    async fn is_team_member(&mut self, team_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(team::is_member(&mut self.tx, team_id, user_id).await?)
    }

    async fn count_team_members(&mut self, team_id: Uuid) -> StoreResult<i64> {
        Ok(team::count_members(&mut self.tx, team_id).await?)
    }

    async fn list_team_members(&mut self, team_id: Uuid) -> StoreResult<Vec<TeamMember>> {
        Ok(team::list_members(&mut self.tx, team_id).await?)
    }

    async fn team_member_counts(&mut self, team_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        Ok(team::member_counts(&mut self.tx, team_ids).await?)
    }

    async fn insert_team_room(&mut self, room: &TeamRoom) -> StoreResult<()> {
        Ok(team_room::insert_room(&mut self.tx, room).await?)
    }

    async fn update_team_room(&mut self, room: &TeamRoom) -> StoreResult<()> {
        Ok(team_room::update_room(&mut self.tx, room).await?)
    }

    async fn find_team_room(&mut self, id: Uuid) -> StoreResult<Option<TeamRoom>> {
        Ok(team_room::find_room(&mut self.tx, id).await?)
    }

    async fn lock_team_room(&mut self, id: Uuid) -> StoreResult<Option<TeamRoom>> {
        Ok(team_room::lock_room(&mut self.tx, id).await?)
    }

    async fn list_team_rooms(
        &mut self,
        filter: &TeamRoomFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<TeamRoom>, i64)> {
        Ok(team_room::list_rooms(&mut self.tx, filter, page).await?)
    }

    async fn team_rooms_of_teams(&mut self, team_ids: &[Uuid]) -> StoreResult<Vec<TeamRoom>> {
        Ok(team_room::rooms_of_teams(&mut self.tx, team_ids).await?)
    }

    async fn team_bookings_on(
        &mut self,
        team_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<TeamRoom>> {
        Ok(team_room::bookings_on(&mut self.tx, team_id, date).await?)
    }

    async fn search_branches(&mut self, text: &str, limit: i64) -> StoreResult<Vec<Branch>> {
        Ok(branch::search_branches(&mut self.tx, text, limit).await?)
    }

    async fn search_individual_rooms(
        &mut self,
        text: &str,
        limit: i64,
    ) -> StoreResult<Vec<IndividualRoom>> {
        Ok(individual_room::search_rooms(&mut self.tx, text, limit).await?)
    }

    async fn search_team_rooms(&mut self, text: &str, limit: i64) -> StoreResult<Vec<TeamRoom>> {
        Ok(team_room::search_rooms(&mut self.tx, text, limit).await?)
    }

    async fn search_teams(&mut self, text: &str, limit: i64) -> StoreResult<Vec<Team>> {
        Ok(team::search_teams(&mut self.tx, text, limit).await?)
    }
}
