use chrono::Duration;
use derive_new::new;

use crate::model::{
    id::{ClubId, UserId},
    invitation::InviteToken,
    role::Role,
    user::event::CreateUserFromInvite,
};

#[derive(new)]
pub struct CreateInvitation {
    pub club_id: ClubId,
    pub email: String,
    pub role: Role,
    pub ttl: Duration,
}

/// 新規ユーザーパス。招待の消費・ユーザー作成・クラブへの紐付けを
/// 1 つのトランザクションで行う
#[derive(new)]
pub struct ConsumeForNewUser {
    pub token: InviteToken,
    pub user: CreateUserFromInvite,
}

/// 既存ユーザーパス。認証済みユーザーの紐付けと招待の消費のみ行う
#[derive(new)]
pub struct ConsumeForExistingUser {
    pub token: InviteToken,
    pub user_id: UserId,
}
