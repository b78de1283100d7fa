pub mod auth;
pub mod club;
pub mod id;
pub mod invitation;
pub mod role;
pub mod user;
