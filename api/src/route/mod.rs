pub mod auth;
pub mod club;
pub mod health;
pub mod invitation;
pub mod user;
pub mod v1;
