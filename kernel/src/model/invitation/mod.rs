pub mod event;

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::model::{
    id::{ClubId, InvitationId, UserId},
    role::Role,
};

const TOKEN_LENGTH: usize = 32;

/// 招待リンクに埋め込む推測不可能なトークン
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct InviteToken(pub String);

impl InviteToken {
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        Self(token)
    }
}

impl std::fmt::Display for InviteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug)]
pub struct Invitation {
    pub invitation_id: InvitationId,
    pub token: InviteToken,
    pub email: String,
    pub club_id: ClubId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

/// 招待リンクの表示に必要な情報。内部 ID は含めない
#[derive(Debug, PartialEq, Eq)]
pub struct InviteDetails {
    pub club_name: String,
    pub role: Role,
    pub email: String,
}

/// 消費に成功した招待の結果。セッション発行とリダイレクト先の決定に使う
#[derive(Debug)]
pub struct ConsumedInvite {
    pub user_id: UserId,
    pub club_id: ClubId,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_is_url_safe_alphanumeric() {
        let token = InviteToken::generate();
        assert_eq!(token.0.len(), TOKEN_LENGTH);
        assert!(token.0.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(InviteToken::generate(), InviteToken::generate());
    }
}
