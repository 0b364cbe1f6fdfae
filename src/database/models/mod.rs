pub mod booking;
pub mod branch;
pub mod individual_room;
pub(crate) mod macros;
pub mod notification;
pub mod page;
pub mod search;
pub mod slot;
pub mod team;
pub mod team_room;
pub mod user;

pub use booking::*;
pub use branch::*;
pub use individual_room::*;
pub use notification::*;
pub use page::*;
pub use search::*;
pub use slot::*;
pub use team::*;
pub use team_room::*;
pub use user::*;
