pub mod auth_gate;
pub mod header;
pub mod home;
pub mod lobby_list;
pub mod lobby_room;
pub mod login;
pub mod notice;
