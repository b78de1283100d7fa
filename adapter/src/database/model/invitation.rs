use std::str::FromStr;

use kernel::model::{
    id::{ClubId, InvitationId},
    invitation::{Invitation, InviteDetails, InviteToken},
    role::Role,
};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, Utc};

#[derive(sqlx::FromRow)]
pub struct InvitationRow {
    pub invitation_id: InvitationId,
    pub token: InviteToken,
    pub email: String,
    pub club_id: ClubId,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = AppError;

    fn try_from(value: InvitationRow) -> Result<Self, Self::Error> {
        let InvitationRow {
            invitation_id,
            token,
            email,
            club_id,
            role_name,
            created_at,
            expires_at,
            consumed_at,
        } = value;
        Ok(Invitation {
            invitation_id,
            token,
            email,
            club_id,
            role: parse_role(&role_name)?,
            created_at,
            expires_at,
            consumed_at,
        })
    }
}

/// 招待の表示情報を取得する際に使う型（clubs と JOIN した結果）
#[derive(sqlx::FromRow)]
pub struct InviteDetailsRow {
    pub club_name: String,
    pub role_name: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl InviteDetailsRow {
    pub fn into_details(self) -> Result<InviteDetails, AppError> {
        Ok(InviteDetails {
            club_name: self.club_name,
            role: parse_role(&self.role_name)?,
            email: self.email,
        })
    }
}

/// 条件付き UPDATE が 0 行だったときの失敗理由の切り分けに使う型
#[derive(sqlx::FromRow)]
pub struct InvitationStateRow {
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

/// 消費に成功した招待から紐付けに必要な値を取り出す型
#[derive(sqlx::FromRow)]
pub struct ConsumedInvitationRow {
    pub club_id: ClubId,
    pub role_name: String,
}

pub fn parse_role(role_name: &str) -> Result<Role, AppError> {
    Role::from_str(role_name).map_err(|e| AppError::ConversionEntityError(e.to_string()))
}
