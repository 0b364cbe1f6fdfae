pub mod bookings;
pub mod branches;
pub mod individual_rooms;
pub mod search;
pub mod shared;
pub mod team_rooms;
pub mod teams;
