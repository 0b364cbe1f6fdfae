pub mod branch;
pub mod individual_room;
pub mod notification;
pub mod team;
pub mod team_room;
pub mod user;
