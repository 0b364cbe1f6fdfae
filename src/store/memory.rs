use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::database::models::{
    Branch, IndividualRoom, PageRequest, Participant, RoomFilter, Team, TeamMember, TeamRoom,
    TeamRoomFilter, TeamStatus, UserSummary,
};
use crate::store::{BookingStore, StoreResult, StoreTx};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: HashMap<Uuid, UserSummary>,
    branches: HashMap<Uuid, Branch>,
    individual_rooms: HashMap<Uuid, IndividualRoom>,
    participants: Vec<Participant>,
    teams: HashMap<Uuid, Team>,
    team_members: Vec<TeamMember>,
    team_rooms: HashMap<Uuid, TeamRoom>,
}

/// In-process store. A transaction owns the state lock from `begin` until it
/// commits or is dropped, so transactions run strictly one after another and
/// only a committed working copy ever becomes visible.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user account. Accounts are owned by the identity system;
    /// the store only needs to know they exist and what to call them.
    pub async fn add_user(&self, id: Uuid, display_name: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.users.insert(
            id,
            UserSummary {
                id,
                display_name: display_name.into(),
            },
        );
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryTx { guard, work }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

fn paginate<T>(mut items: Vec<T>, page: PageRequest) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let offset = (page.offset() as usize).min(items.len());
    let mut rest = items.split_off(offset);
    rest.truncate(page.limit() as usize);
    (rest, total)
}

fn name_matches(name: &str, fragment: Option<&str>) -> bool {
    match fragment.map(str::trim).filter(|f| !f.is_empty()) {
        Some(fragment) => name.to_lowercase().contains(&fragment.to_lowercase()),
        None => true,
    }
}

fn contains_text(value: Option<&str>, needle: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(needle))
}

fn within(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
}

impl MemoryTx {
    fn branch_name_contains(&self, branch_id: Uuid, needle: &str) -> bool {
        contains_text(self.work.branches.get(&branch_id).map(|b| b.name.as_str()), needle)
    }

    fn team_name_contains(&self, team_id: Option<Uuid>, needle: &str) -> bool {
        contains_text(
            team_id
                .and_then(|id| self.work.teams.get(&id))
                .map(|t| t.name.as_str()),
            needle,
        )
    }

    fn rooms_joined_by(&self, user_ids: &HashSet<Uuid>) -> HashSet<Uuid> {
        self.work
            .participants
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .map(|p| p.room_id)
            .collect()
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }

    async fn user_exists(&mut self, user_id: Uuid) -> StoreResult<bool> {
        Ok(self.work.users.contains_key(&user_id))
    }

    async fn find_users(&mut self, ids: &[Uuid]) -> StoreResult<Vec<UserSummary>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.work.users.get(id).cloned())
            .collect())
    }

    async fn insert_branch(&mut self, branch: &Branch) -> StoreResult<()> {
        self.work.branches.insert(branch.id, branch.clone());
        Ok(())
    }

    async fn update_branch(&mut self, branch: &Branch) -> StoreResult<()> {
        self.work.branches.insert(branch.id, branch.clone());
        Ok(())
    }

    async fn find_branch(&mut self, id: Uuid) -> StoreResult<Option<Branch>> {
        Ok(self.work.branches.get(&id).cloned())
    }

    async fn find_branches(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Branch>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.work.branches.get(id).cloned())
            .collect())
    }

    async fn list_active_branches(
        &mut self,
        name: Option<&str>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Branch>, i64)> {
        let mut branches: Vec<Branch> = self
            .work
            .branches
            .values()
            .filter(|b| b.is_active && name_matches(&b.name, name))
            .cloned()
            .collect();
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(branches, page))
    }

    async fn insert_individual_room(&mut self, room: &IndividualRoom) -> StoreResult<()> {
        self.work.individual_rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn update_individual_room(&mut self, room: &IndividualRoom) -> StoreResult<()> {
        self.work.individual_rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn find_individual_room(&mut self, id: Uuid) -> StoreResult<Option<IndividualRoom>> {
        Ok(self.work.individual_rooms.get(&id).cloned())
    }

    async fn lock_individual_room(&mut self, id: Uuid) -> StoreResult<Option<IndividualRoom>> {
        self.find_individual_room(id).await
    }

    async fn list_individual_rooms(
        &mut self,
        filter: &RoomFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<IndividualRoom>, i64)> {
        let mut rooms: Vec<IndividualRoom> = self
            .work
            .individual_rooms
            .values()
            .filter(|r| !r.is_cancelled())
            .filter(|r| filter.branch_id.is_none_or(|b| r.branch_id == b))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .filter(|r| within(r.scheduled_date, filter.date_from, filter.date_to))
            .cloned()
            .collect();
        rooms.sort_by_key(|r| (r.scheduled_date, r.start_time, r.created_at));
        Ok(paginate(rooms, page))
    }

    async fn individual_rooms_of_user(&mut self, user_id: Uuid) -> StoreResult<Vec<IndividualRoom>> {
        let joined = self.rooms_joined_by(&HashSet::from([user_id]));
        Ok(self
            .work
            .individual_rooms
            .values()
            .filter(|r| joined.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn individual_bookings_on(
        &mut self,
        user_ids: &[Uuid],
        date: NaiveDate,
    ) -> StoreResult<Vec<IndividualRoom>> {
        let joined = self.rooms_joined_by(&user_ids.iter().copied().collect());
        Ok(self
            .work
            .individual_rooms
            .values()
            .filter(|r| joined.contains(&r.id) && r.scheduled_date == date && !r.is_cancelled())
            .cloned()
            .collect())
    }

    async fn insert_participant(&mut self, participant: &Participant) -> StoreResult<()> {
        self.work.participants.push(participant.clone());
        Ok(())
    }

    async fn delete_participant(&mut self, room_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let before = self.work.participants.len();
        self.work
            .participants
            .retain(|p| !(p.room_id == room_id && p.user_id == user_id));
        Ok(self.work.participants.len() < before)
    }

    async fn is_participant(&mut self, room_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .work
            .participants
            .iter()
            .any(|p| p.room_id == room_id && p.user_id == user_id))
    }

    async fn count_participants(&mut self, room_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .work
            .participants
            .iter()
            .filter(|p| p.room_id == room_id)
            .count() as i64)
    }

    async fn list_participants(&mut self, room_id: Uuid) -> StoreResult<Vec<Participant>> {
        let mut participants: Vec<Participant> = self
            .work
            .participants
            .iter()
            .filter(|p| p.room_id == room_id)
            .cloned()
            .collect();
        participants.sort_by_key(|p| p.joined_at);
        Ok(participants)
    }

    async fn participant_counts(&mut self, room_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        let mut counts: HashMap<Uuid, i64> = room_ids.iter().map(|id| (*id, 0)).collect();
        for p in &self.work.participants {
            if let Some(count) = counts.get_mut(&p.room_id) {
                *count += 1;
            }
        }
        Ok(counts)
    }

    async fn insert_team(&mut self, team: &Team) -> StoreResult<()> {
        self.work.teams.insert(team.id, team.clone());
        Ok(())
    }

    async fn update_team(&mut self, team: &Team) -> StoreResult<()> {
        self.work.teams.insert(team.id, team.clone());
        Ok(())
    }

    async fn find_team(&mut self, id: Uuid) -> StoreResult<Option<Team>> {
        Ok(self.work.teams.get(&id).cloned())
    }

    async fn lock_team(&mut self, id: Uuid) -> StoreResult<Option<Team>> {
        self.find_team(id).await
    }

    async fn find_teams(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Team>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.work.teams.get(id).cloned())
            .collect())
    }

    async fn list_active_teams(
        &mut self,
        name: Option<&str>,
        page: PageRequest,
    ) -> StoreResult<(Vec<Team>, i64)> {
        let mut teams: Vec<Team> = self
            .work
            .teams
            .values()
            .filter(|t| t.status == TeamStatus::Active && name_matches(&t.name, name))
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(teams, page))
    }

    async fn teams_captained_by(&mut self, user_id: Uuid) -> StoreResult<Vec<Team>> {
        let mut teams: Vec<Team> = self
            .work
            .teams
            .values()
            .filter(|t| t.is_active() && t.captain_id == user_id)
            .cloned()
            .collect();
        teams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(teams)
    }

    async fn teams_of_member(&mut self, user_id: Uuid) -> StoreResult<Vec<Team>> {
        let ids = self.team_ids_of_user(user_id).await?;
        let mut teams: Vec<Team> = ids
            .iter()
            .filter_map(|id| self.work.teams.get(id))
            .filter(|t| t.is_active())
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn team_ids_of_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(self
            .work
            .team_members
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.team_id)
            .collect())
    }

    async fn insert_team_member(&mut self, member: &TeamMember) -> StoreResult<()> {
        self.work.team_members.push(member.clone());
        Ok(())
    }

    async fn delete_team_member(&mut self, team_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let before = self.work.team_members.len();
        self.work
            .team_members
            .retain(|m| !(m.team_id == team_id && m.user_id == user_id));
        Ok(self.work.team_members.len() < before)
    }

    async fn is_team_member(&mut self, team_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .work
            .team_members
            .iter()
            .any(|m| m.team_id == team_id && m.user_id == user_id))
    }

    async fn count_team_members(&mut self, team_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .work
            .team_members
            .iter()
            .filter(|m| m.team_id == team_id)
            .count() as i64)
    }

    async fn list_team_members(&mut self, team_id: Uuid) -> StoreResult<Vec<TeamMember>> {
        let mut members: Vec<TeamMember> = self
            .work
            .team_members
            .iter()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    async fn team_member_counts(&mut self, team_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        let mut counts: HashMap<Uuid, i64> = team_ids.iter().map(|id| (*id, 0)).collect();
        for m in &self.work.team_members {
            if let Some(count) = counts.get_mut(&m.team_id) {
                *count += 1;
            }
        }
        Ok(counts)
    }

    async fn insert_team_room(&mut self, room: &TeamRoom) -> StoreResult<()> {
        self.work.team_rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn update_team_room(&mut self, room: &TeamRoom) -> StoreResult<()> {
        self.work.team_rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn find_team_room(&mut self, id: Uuid) -> StoreResult<Option<TeamRoom>> {
        Ok(self.work.team_rooms.get(&id).cloned())
    }

    async fn lock_team_room(&mut self, id: Uuid) -> StoreResult<Option<TeamRoom>> {
        self.find_team_room(id).await
    }

    async fn list_team_rooms(
        &mut self,
        filter: &TeamRoomFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<TeamRoom>, i64)> {
        let mut rooms: Vec<TeamRoom> = self
            .work
            .team_rooms
            .values()
            .filter(|r| !r.is_cancelled())
            .filter(|r| filter.branch_id.is_none_or(|b| r.branch_id == b))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .filter(|r| filter.team_size.is_none_or(|n| r.required_team_size == n))
            .filter(|r| within(r.scheduled_date, filter.date_from, filter.date_to))
            .cloned()
            .collect();
        rooms.sort_by_key(|r| (r.scheduled_date, r.start_time, r.created_at));
        Ok(paginate(rooms, page))
    }

    async fn team_rooms_of_teams(&mut self, team_ids: &[Uuid]) -> StoreResult<Vec<TeamRoom>> {
        Ok(self
            .work
            .team_rooms
            .values()
            .filter(|r| team_ids.iter().any(|id| r.involves(*id)))
            .cloned()
            .collect())
    }

    async fn team_bookings_on(
        &mut self,
        team_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<TeamRoom>> {
        Ok(self
            .work
            .team_rooms
            .values()
            .filter(|r| r.involves(team_id) && r.scheduled_date == date && !r.is_cancelled())
            .cloned()
            .collect())
    }

    async fn search_branches(&mut self, text: &str, limit: i64) -> StoreResult<Vec<Branch>> {
        let needle = text.trim().to_lowercase();
        let mut branches: Vec<Branch> = self
            .work
            .branches
            .values()
            .filter(|b| b.is_active)
            .filter(|b| {
                contains_text(Some(b.name.as_str()), &needle)
                    || contains_text(Some(b.address.as_str()), &needle)
            })
            .cloned()
            .collect();
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        branches.truncate(limit.max(0) as usize);
        Ok(branches)
    }

    async fn search_individual_rooms(
        &mut self,
        text: &str,
        limit: i64,
    ) -> StoreResult<Vec<IndividualRoom>> {
        let needle = text.trim().to_lowercase();
        let mut rooms: Vec<IndividualRoom> = self
            .work
            .individual_rooms
            .values()
            .filter(|r| !r.is_cancelled())
            .filter(|r| {
                self.branch_name_contains(r.branch_id, &needle)
                    || contains_text(
                        self.work.users.get(&r.owner_id).map(|u| u.display_name.as_str()),
                        &needle,
                    )
                    || contains_text(r.notes.as_deref(), &needle)
            })
            .cloned()
            .collect();
        rooms.sort_by_key(|r| (r.scheduled_date, r.start_time, r.created_at));
        rooms.truncate(limit.max(0) as usize);
        Ok(rooms)
    }

    async fn search_team_rooms(&mut self, text: &str, limit: i64) -> StoreResult<Vec<TeamRoom>> {
        let needle = text.trim().to_lowercase();
        let mut rooms: Vec<TeamRoom> = self
            .work
            .team_rooms
            .values()
            .filter(|r| !r.is_cancelled())
            .filter(|r| {
                self.branch_name_contains(r.branch_id, &needle)
                    || self.team_name_contains(Some(r.creator_team_id), &needle)
                    || self.team_name_contains(r.opponent_team_id, &needle)
            })
            .cloned()
            .collect();
        rooms.sort_by_key(|r| (r.scheduled_date, r.start_time, r.created_at));
        rooms.truncate(limit.max(0) as usize);
        Ok(rooms)
    }

    async fn search_teams(&mut self, text: &str, limit: i64) -> StoreResult<Vec<Team>> {
        let needle = text.trim().to_lowercase();
        let mut teams: Vec<Team> = self
            .work
            .teams
            .values()
            .filter(|t| t.is_active())
            .filter(|t| {
                contains_text(Some(t.name.as_str()), &needle)
                    || contains_text(t.description.as_deref(), &needle)
            })
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        teams.truncate(limit.max(0) as usize);
        Ok(teams)
    }
}
