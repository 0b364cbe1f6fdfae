use std::sync::Arc;

use chrono::NaiveDateTime;
use mockable::Clock;
use uuid::Uuid;

use crate::store::StoreTx;

pub mod booking;
pub mod branch;
pub mod conflict;
pub mod error;
pub mod individual_room;
pub mod notifier;
pub mod search;
pub mod team_room;
pub mod team_roster;
pub mod time_window;

pub use booking::BookingService;
pub use branch::BranchService;
pub use error::{BookingError, BookingResult, ErrorKind};
pub use individual_room::IndividualRoomService;
pub use notifier::{LogNotifier, NotificationSink, PgNotifier};
pub use search::SearchService;
pub use team_room::TeamRoomService;
pub use team_roster::TeamService;

pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Booking dates and times are wall-clock values at the venue, so "now" is
/// the server's local time.
pub(crate) fn local_now(clock: &SharedClock) -> NaiveDateTime {
    clock.local().naive_local()
}

/// Rejects identities that do not resolve to a known account before they
/// can own or occupy anything.
pub(crate) async fn ensure_caller(tx: &mut dyn StoreTx, caller: Uuid) -> BookingResult<()> {
    if tx.user_exists(caller).await? {
        Ok(())
    } else {
        Err(BookingError::UserNotFound)
    }
}

/// Commits on success. On failure the transaction is rolled back and the
/// original error returned.
pub(crate) async fn finish<T>(tx: Box<dyn StoreTx>, result: BookingResult<T>) -> BookingResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            log::warn!("Transaction failed with error: {}, rolling back", err);
            if let Err(rollback_err) = tx.rollback().await {
                log::error!(
                    "Rollback failed after error (orig: {}, rollback: {})",
                    err,
                    rollback_err
                );
            }
            Err(err)
        }
    }
}
