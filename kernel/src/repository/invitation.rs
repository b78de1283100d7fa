use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::invitation::{
    event::{ConsumeForExistingUser, ConsumeForNewUser, CreateInvitation},
    ConsumedInvite, Invitation, InviteDetails, InviteToken,
};

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    // 招待を発行する
    async fn create(&self, event: CreateInvitation) -> AppResult<Invitation>;
    // トークンから有効な招待の表示情報を取得する（読み取りのみ）
    async fn find_details_by_token(&self, token: &InviteToken) -> AppResult<InviteDetails>;
    // 新規ユーザーパス：ユーザー作成・紐付け・消費を 1 トランザクションで行う
    async fn consume_for_new_user(&self, event: ConsumeForNewUser) -> AppResult<ConsumedInvite>;
    // 既存ユーザーパス：紐付けと消費を 1 トランザクションで行う
    async fn consume_for_existing_user(
        &self,
        event: ConsumeForExistingUser,
    ) -> AppResult<ConsumedInvite>;
}
