use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    invitation::{ConsumedInvite, Invitation, InviteDetails},
    user::event::CreateUserFromInvite,
};
use serde::{Deserialize, Serialize};

use crate::model::user::RoleName;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    #[garde(email)]
    pub email: String,
    #[garde(skip)]
    pub role: RoleName,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Invitation> for InvitationResponse {
    fn from(value: Invitation) -> Self {
        Self {
            token: value.token.0,
            expires_at: value.expires_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteDetailsResponse {
    pub club_name: String,
    pub role: RoleName,
    pub email: String,
}

impl From<InviteDetails> for InviteDetailsResponse {
    fn from(value: InviteDetails) -> Self {
        let InviteDetails {
            club_name,
            role,
            email,
        } = value;
        Self {
            club_name,
            role: RoleName::from(role),
            email,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFromInviteRequest {
    #[garde(length(min = 1))]
    pub first_name: String,
    #[garde(length(min = 1))]
    pub last_name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 6))]
    pub password: String,
    #[garde(skip)]
    pub confirm_password: String,
}

impl From<RegisterFromInviteRequest> for CreateUserFromInvite {
    fn from(value: RegisterFromInviteRequest) -> Self {
        let RegisterFromInviteRequest {
            first_name,
            last_name,
            email,
            password,
            confirm_password: _,
        } = value;
        CreateUserFromInvite {
            user_name: format!("{first_name} {last_name}"),
            email,
            password,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignInviteRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// 消費に成功したときの応答。クライアントはロールに応じた
/// ダッシュボードへ遷移する
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedInviteResponse {
    pub access_token: String,
    pub role: RoleName,
}

impl ConsumedInviteResponse {
    pub fn new(access_token: String, consumed: &ConsumedInvite) -> Self {
        Self {
            access_token,
            role: RoleName::from(consumed.role),
        }
    }
}
