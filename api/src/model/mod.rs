pub mod auth;
pub mod club;
pub mod invitation;
pub mod user;
