pub mod event;

use chrono::{DateTime, Utc};

use crate::model::id::ClubId;

#[derive(Debug)]
pub struct Club {
    pub club_id: ClubId,
    pub club_name: String,
    pub created_at: DateTime<Utc>,
}
