#![allow(dead_code)]

use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use fake::Fake;
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use jsonwebtoken::{EncodingKey, Header, encode};
use mockable::Clock;
use sqlx::PgPool;
use uuid::Uuid;

use stadium_booking::auth::Claims;
use stadium_booking::config::StoreBackend;
use stadium_booking::database::models::{
    Branch, CreateBranchInput, CreateIndividualRoomInput, CreateTeamInput, Notification,
    NotificationType, Team, UserSummary,
};
use stadium_booking::database::repositories::user::upsert_user;
use stadium_booking::database::{PgStore, init_database};
use stadium_booking::{AppState, Config, MemoryStore, NotificationSink, SharedClock};

pub const JWT_SECRET: &str = "test-jwt-secret-key-that-is-long-enough";

/// Wall clock pinned to a local date and time. Tests move it forward to turn
/// upcoming bookings into past ones.
pub struct TestClock {
    now: Mutex<NaiveDateTime>,
}

impl TestClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().expect("clock lock poisoned") = now;
    }
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        let now = *self.now.lock().expect("clock lock poisoned");
        Local
            .from_local_datetime(&now)
            .earliest()
            .expect("fixture time exists in the local zone")
    }

    fn utc(&self) -> DateTime<Utc> {
        self.local().with_timezone(&Utc)
    }
}

/// Keeps every delivered notification for later assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }

    pub fn types_for(&self, user_id: Uuid) -> Vec<NotificationType> {
        self.sent()
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.notification_type)
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().expect("notifier lock poisoned").clear();
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push(notification.clone());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).expect("valid time")
}

/// Booking day used throughout the suites.
pub fn match_day() -> NaiveDate {
    date(2025, 6, 1)
}

/// Services wired over a fresh in-memory store.
pub struct TestEnv {
    pub store: MemoryStore,
    pub clock: Arc<TestClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: AppState,
}

impl TestEnv {
    /// The clock starts at 07:00 on the match day, before any branch opens.
    pub fn new() -> Self {
        Self::at(at(match_day(), 7, 0))
    }

    pub fn at(now: NaiveDateTime) -> Self {
        let store = MemoryStore::new();
        let clock = Arc::new(TestClock::at(now));
        let notifier = Arc::new(RecordingNotifier::default());

        let shared_clock: SharedClock = clock.clone();
        let sink: Arc<dyn NotificationSink> = notifier.clone();
        let state = AppState::new(Arc::new(store.clone()), sink, shared_clock);

        Self {
            store,
            clock,
            notifier,
            state,
        }
    }

    pub async fn user(&self) -> Uuid {
        self.user_named(&Name().fake::<String>()).await
    }

    pub async fn user_named(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.store.add_user(id, name).await;
        id
    }

    pub async fn users(&self, count: usize) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.user().await);
        }
        ids
    }

    /// An active branch open 08:00 to 22:00.
    pub async fn branch(&self) -> Branch {
        seed_branch(&self.state, MockData::branch("08:00", "22:00")).await
    }

    pub async fn branch_named(&self, name: &str, address: &str) -> Branch {
        let mut input = MockData::branch("08:00", "22:00");
        input.name = name.to_string();
        input.address = address.to_string();
        seed_branch(&self.state, input).await
    }

    /// A team whose roster holds `members` players, captain included. The
    /// captain is the first id returned.
    pub async fn team(&self, roster_size: i32, members: usize) -> (Team, Vec<Uuid>) {
        let roster = self.users(members).await;
        seed_team(&self.state, MockData::team(roster_size), roster).await
    }

    pub async fn full_team(&self, roster_size: i32) -> (Team, Vec<Uuid>) {
        self.team(roster_size, roster_size as usize).await
    }
}

pub async fn seed_branch(state: &AppState, input: CreateBranchInput) -> Branch {
    state
        .branches
        .create_branch(input)
        .await
        .expect("Failed to create test branch")
}

/// Creates a team led by the first of `roster` and signs up the rest.
pub async fn seed_team(
    state: &AppState,
    input: CreateTeamInput,
    roster: Vec<Uuid>,
) -> (Team, Vec<Uuid>) {
    let captain = roster[0];
    let summary = state
        .teams
        .create_team(captain, input)
        .await
        .expect("Failed to create test team");

    for player in &roster[1..] {
        state
            .teams
            .add_member(captain, summary.team.id, *player)
            .await
            .expect("Failed to add test team member");
    }
    (summary.team, roster)
}

/// Services wired over the Postgres database named by `DATABASE_URL`.
/// Every fixture gets fresh ids, so suites can share one database.
pub struct PgTestContext {
    pub pool: PgPool,
    pub clock: Arc<TestClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: AppState,
}

impl PgTestContext {
    /// `None` when no database is configured; callers skip in that case.
    pub async fn new() -> Option<Self> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())?;
        let pool = init_database(&database_url, 10)
            .await
            .expect("Failed to prepare test database");

        let clock = Arc::new(TestClock::at(at(match_day(), 7, 0)));
        let notifier = Arc::new(RecordingNotifier::default());
        let shared_clock: SharedClock = clock.clone();
        let sink: Arc<dyn NotificationSink> = notifier.clone();
        let state = AppState::new(Arc::new(PgStore::new(pool.clone())), sink, shared_clock);

        Some(Self {
            pool,
            clock,
            notifier,
            state,
        })
    }

    pub async fn user(&self) -> Uuid {
        let user = UserSummary {
            id: Uuid::new_v4(),
            display_name: Name().fake(),
        };
        let mut tx = self.pool.begin().await.expect("Failed to open transaction");
        upsert_user(&mut tx, &user)
            .await
            .expect("Failed to insert test user");
        tx.commit().await.expect("Failed to commit test user");
        user.id
    }

    pub async fn users(&self, count: usize) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.user().await);
        }
        ids
    }

    pub async fn branch_named(&self, name: &str) -> Branch {
        let mut input = MockData::branch("08:00", "22:00");
        input.name = name.to_string();
        seed_branch(&self.state, input).await
    }

    pub async fn full_team(&self, roster_size: i32) -> (Team, Vec<Uuid>) {
        let roster = self.users(roster_size as usize).await;
        seed_team(&self.state, MockData::team(roster_size), roster).await
    }
}

pub struct MockData;

impl MockData {
    pub fn branch(open: &str, close: &str) -> CreateBranchInput {
        CreateBranchInput {
            name: format!("{} Arena", CompanyName().fake::<String>()),
            address: "1 Stadium Way".to_string(),
            google_maps_url: None,
            operating_hours_start: open.to_string(),
            operating_hours_end: close.to_string(),
            contact_phone: Some("+1-555-0100".to_string()),
            contact_email: None,
            latitude: None,
            longitude: None,
        }
    }

    pub fn team(roster_size: i32) -> CreateTeamInput {
        CreateTeamInput {
            name: CompanyName().fake(),
            description: None,
            logo_url: None,
            roster_size,
        }
    }

    pub fn individual_room(
        branch_id: Uuid,
        day: NaiveDate,
        start: &str,
        end: &str,
        total_slots: i32,
    ) -> CreateIndividualRoomInput {
        CreateIndividualRoomInput {
            branch_id,
            scheduled_date: day.format("%Y-%m-%d").to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            total_slots,
            notes: None,
        }
    }

    pub fn config() -> Config {
        Config {
            database_url: "postgres://@localhost:5432/stadium_booking_test".to_string(),
            database_max_connections: 1,
            jwt_secret: JWT_SECRET.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            client_base_url: "http://localhost:3000".to_string(),
            store_backend: StoreBackend::Memory,
        }
    }
}

pub struct AuthHelper;

impl AuthHelper {
    pub fn create_test_token(user_id: Uuid) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_ref()),
        )
        .expect("Failed to sign test token")
    }

    pub fn auth_header(user_id: Uuid) -> (&'static str, String) {
        (
            "Authorization",
            format!("Bearer {}", Self::create_test_token(user_id)),
        )
    }
}
