pub mod club;
pub mod invitation;
pub mod user;
