use garde::Validate;
use kernel::model::{
    club::{event::CreateClub, Club},
    id::ClubId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    #[garde(length(min = 1))]
    pub club_name: String,
}

impl From<CreateClubRequest> for CreateClub {
    fn from(value: CreateClubRequest) -> Self {
        CreateClub {
            club_name: value.club_name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubsResponse {
    pub items: Vec<ClubResponse>,
}

impl From<Vec<Club>> for ClubsResponse {
    fn from(value: Vec<Club>) -> Self {
        Self {
            items: value.into_iter().map(ClubResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubResponse {
    pub club_id: ClubId,
    pub club_name: String,
}

impl From<Club> for ClubResponse {
    fn from(value: Club) -> Self {
        let Club {
            club_id,
            club_name,
            created_at: _,
        } = value;
        Self { club_id, club_name }
    }
}
