use kernel::model::{club::Club, id::ClubId};
use sqlx::types::chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct ClubRow {
    pub club_id: ClubId,
    pub club_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ClubRow> for Club {
    fn from(value: ClubRow) -> Self {
        let ClubRow {
            club_id,
            club_name,
            created_at,
        } = value;
        Club {
            club_id,
            club_name,
            created_at,
        }
    }
}
