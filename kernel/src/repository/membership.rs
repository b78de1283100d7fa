use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::id::{ClubId, UserId};

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    // ユーザーをクラブのリーダーとして紐付ける。
    // すでに紐付いている場合は何もせず成功を返す
    async fn bind(&self, user_id: UserId, club_id: ClubId) -> AppResult<()>;
    // ユーザーがリーダーを務めるクラブの一覧を取得する
    async fn leadership_clubs_for(&self, user_id: UserId) -> AppResult<Vec<ClubId>>;
}
