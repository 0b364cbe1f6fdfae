use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::models::{
    CreateTeamInput, MemberView, Notification, NotificationType, Page, PageRequest,
    RelatedEntity, Team, TeamDetail, TeamMember, TeamStatus, TeamSummary, UpdateTeamInput,
    UserSummary,
};
use crate::services::error::{BookingError, BookingResult};
use crate::services::{ensure_caller, finish};
use crate::services::notifier::{NotificationSink, dispatch};
use crate::store::{BookingStore, StoreTx};

pub const MIN_ROSTER_SIZE: i32 = 2;

#[derive(Clone)]
pub struct TeamService {
    store: Arc<dyn BookingStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl TeamService {
    pub fn new(store: Arc<dyn BookingStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    pub async fn create_team(&self, caller: Uuid, input: CreateTeamInput) -> BookingResult<TeamSummary> {
        let name = required_name(&input.name)?;
        if input.roster_size < MIN_ROSTER_SIZE {
            return Err(BookingError::InvalidRosterSize);
        }

        let now = Utc::now();
        let team = Team {
            id: Uuid::new_v4(),
            name,
            description: input.description,
            logo_url: input.logo_url,
            captain_id: caller,
            roster_size: input.roster_size,
            status: TeamStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        let result = insert_team_with_captain(tx.as_mut(), &team).await;
        finish(tx, result).await?;

        log::info!("Created team {} with captain {}", team.id, caller);
        Ok(TeamSummary::new(team, 1))
    }

    pub async fn update_team(
        &self,
        caller: Uuid,
        team_id: Uuid,
        input: UpdateTeamInput,
    ) -> BookingResult<TeamSummary> {
        let mut tx = self.store.begin().await?;
        let result = update_team_in_tx(tx.as_mut(), caller, team_id, input).await;
        let summary = finish(tx, result).await?;

        log::info!("Updated team {} by captain {}", team_id, caller);
        Ok(summary)
    }

    pub async fn add_member(&self, caller: Uuid, team_id: Uuid, user_id: Uuid) -> BookingResult<TeamSummary> {
        let mut tx = self.store.begin().await?;
        let result = add_member_in_tx(tx.as_mut(), caller, team_id, user_id).await;
        let summary = finish(tx, result).await?;

        log::info!("Added user {} to team {} by captain {}", user_id, team_id, caller);
        dispatch(
            &self.notifier,
            vec![Notification::new(
                user_id,
                NotificationType::TeamInvitation,
                "Added to a team",
                format!("You have been added to team {}", summary.team.name),
                (RelatedEntity::Team, team_id),
            )],
        )
        .await;
        Ok(summary)
    }

    pub async fn remove_member(
        &self,
        caller: Uuid,
        team_id: Uuid,
        user_id: Uuid,
    ) -> BookingResult<TeamSummary> {
        let mut tx = self.store.begin().await?;
        let result = remove_member_in_tx(tx.as_mut(), caller, team_id, user_id).await;
        let summary = finish(tx, result).await?;

        log::info!("Removed user {} from team {} by captain {}", user_id, team_id, caller);
        Ok(summary)
    }

    pub async fn transfer_captain(
        &self,
        caller: Uuid,
        team_id: Uuid,
        new_captain_id: Uuid,
    ) -> BookingResult<TeamSummary> {
        let mut tx = self.store.begin().await?;
        let result = transfer_captain_in_tx(tx.as_mut(), caller, team_id, new_captain_id).await;
        let summary = finish(tx, result).await?;

        log::info!(
            "Transferred captain role in team {} from {} to {}",
            team_id,
            caller,
            new_captain_id
        );
        dispatch(
            &self.notifier,
            vec![Notification::new(
                new_captain_id,
                NotificationType::TeamUpdate,
                "You are now captain",
                format!("You are now the captain of team {}", summary.team.name),
                (RelatedEntity::Team, team_id),
            )],
        )
        .await;
        Ok(summary)
    }

    pub async fn disband_team(&self, caller: Uuid, team_id: Uuid) -> BookingResult<TeamSummary> {
        let mut tx = self.store.begin().await?;
        let result = disband_team_in_tx(tx.as_mut(), caller, team_id).await;
        let summary = finish(tx, result).await?;

        log::info!("Team {} disbanded by captain {}", team_id, caller);
        Ok(summary)
    }

    pub async fn get_team(&self, team_id: Uuid) -> BookingResult<TeamDetail> {
        let mut tx = self.store.begin().await?;
        let result = team_detail(tx.as_mut(), team_id).await;
        finish(tx, result).await
    }

    pub async fn list_teams(
        &self,
        name: Option<String>,
        page: PageRequest,
    ) -> BookingResult<Page<TeamSummary>> {
        let mut tx = self.store.begin().await?;
        let result: BookingResult<Page<TeamSummary>> = async {
            let (teams, total) = tx.list_active_teams(name.as_deref(), page).await?;
            let items = summarize(tx.as_mut(), teams).await?;
            Ok(Page::new(items, total, page))
        }
        .await;
        finish(tx, result).await
    }

    pub async fn my_teams_as_captain(&self, caller: Uuid) -> BookingResult<Vec<TeamSummary>> {
        let mut tx = self.store.begin().await?;
        let result: BookingResult<Vec<TeamSummary>> = async {
            let teams = tx.teams_captained_by(caller).await?;
            summarize(tx.as_mut(), teams).await
        }
        .await;
        finish(tx, result).await
    }

    pub async fn my_teams_as_member(&self, caller: Uuid) -> BookingResult<Vec<TeamSummary>> {
        let mut tx = self.store.begin().await?;
        let result: BookingResult<Vec<TeamSummary>> = async {
            let teams = tx.teams_of_member(caller).await?;
            summarize(tx.as_mut(), teams).await
        }
        .await;
        finish(tx, result).await
    }
}

fn required_name(name: &str) -> BookingResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BookingError::InvalidName("Team name"));
    }
    Ok(trimmed.to_string())
}

/// Loads an active team under its row lock and checks the caller leads it.
async fn lock_captained_team(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    team_id: Uuid,
) -> BookingResult<Team> {
    let team = tx
        .lock_team(team_id)
        .await?
        .filter(Team::is_active)
        .ok_or(BookingError::TeamNotFound)?;

    if !team.is_captain(caller) {
        return Err(BookingError::NotCaptain);
    }
    Ok(team)
}

async fn insert_team_with_captain(tx: &mut dyn StoreTx, team: &Team) -> BookingResult<()> {
    ensure_caller(tx, team.captain_id).await?;

    tx.insert_team(team).await?;
    tx.insert_team_member(&TeamMember {
        team_id: team.id,
        user_id: team.captain_id,
        joined_at: team.created_at,
    })
    .await?;
    Ok(())
}

async fn update_team_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    team_id: Uuid,
    input: UpdateTeamInput,
) -> BookingResult<TeamSummary> {
    let mut team = lock_captained_team(tx, caller, team_id).await?;

    if let Some(name) = input.name {
        team.name = required_name(&name)?;
    }
    if let Some(description) = input.description {
        team.description = Some(description);
    }
    if let Some(logo_url) = input.logo_url {
        team.logo_url = Some(logo_url);
    }
    team.updated_at = Utc::now();
    tx.update_team(&team).await?;

    let members = tx.count_team_members(team.id).await?;
    Ok(TeamSummary::new(team, members))
}

async fn add_member_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    team_id: Uuid,
    user_id: Uuid,
) -> BookingResult<TeamSummary> {
    let team = lock_captained_team(tx, caller, team_id).await?;

    if tx.is_team_member(team.id, user_id).await? {
        return Err(BookingError::AlreadyMember);
    }

    let members = tx.count_team_members(team.id).await?;
    if team.has_full_roster(members) {
        return Err(BookingError::TeamFull);
    }

    if !tx.user_exists(user_id).await? {
        return Err(BookingError::UserNotFound);
    }

    tx.insert_team_member(&TeamMember {
        team_id: team.id,
        user_id,
        joined_at: Utc::now(),
    })
    .await?;

    Ok(TeamSummary::new(team, members + 1))
}

async fn remove_member_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    team_id: Uuid,
    user_id: Uuid,
) -> BookingResult<TeamSummary> {
    let team = lock_captained_team(tx, caller, team_id).await?;

    if team.is_captain(user_id) {
        return Err(BookingError::CannotRemoveCaptain);
    }

    if !tx.is_team_member(team.id, user_id).await? {
        return Err(BookingError::NotTeamMember);
    }

    tx.delete_team_member(team.id, user_id).await?;

    let members = tx.count_team_members(team.id).await?;
    Ok(TeamSummary::new(team, members))
}

async fn transfer_captain_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    team_id: Uuid,
    new_captain_id: Uuid,
) -> BookingResult<TeamSummary> {
    let mut team = lock_captained_team(tx, caller, team_id).await?;

    if new_captain_id == caller {
        return Err(BookingError::AlreadyCaptain);
    }

    if !tx.is_team_member(team.id, new_captain_id).await? {
        return Err(BookingError::NewCaptainNotMember);
    }

    if !tx.user_exists(new_captain_id).await? {
        return Err(BookingError::UserNotFound);
    }

    team.captain_id = new_captain_id;
    team.updated_at = Utc::now();
    tx.update_team(&team).await?;

    let members = tx.count_team_members(team.id).await?;
    Ok(TeamSummary::new(team, members))
}

async fn disband_team_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    team_id: Uuid,
) -> BookingResult<TeamSummary> {
    let mut team = lock_captained_team(tx, caller, team_id).await?;

    // membership rows stay as history
    team.status = TeamStatus::Disbanded;
    team.updated_at = Utc::now();
    tx.update_team(&team).await?;

    let members = tx.count_team_members(team.id).await?;
    Ok(TeamSummary::new(team, members))
}

pub(crate) async fn summarize(
    tx: &mut dyn StoreTx,
    teams: Vec<Team>,
) -> BookingResult<Vec<TeamSummary>> {
    let ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();
    let counts = tx.team_member_counts(&ids).await?;
    Ok(teams
        .into_iter()
        .map(|team| {
            let members = counts.get(&team.id).copied().unwrap_or(0);
            TeamSummary::new(team, members)
        })
        .collect())
}

async fn team_detail(tx: &mut dyn StoreTx, team_id: Uuid) -> BookingResult<TeamDetail> {
    let team = tx
        .find_team(team_id)
        .await?
        .filter(Team::is_active)
        .ok_or(BookingError::TeamNotFound)?;

    let members = tx.list_team_members(team.id).await?;
    let member_count = members.len() as i64;
    let user_ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();
    let users: HashMap<Uuid, UserSummary> = tx
        .find_users(&user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let members = members
        .into_iter()
        .filter_map(|m| {
            users.get(&m.user_id).map(|user| MemberView {
                user: user.clone(),
                joined_at: m.joined_at,
                is_captain: team.is_captain(m.user_id),
            })
        })
        .collect();

    Ok(TeamDetail {
        summary: TeamSummary::new(team, member_count),
        members,
    })
}
