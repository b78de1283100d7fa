use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{invitation::InviteToken, role::Role};

/// 招待メールの内容
#[derive(Debug)]
pub struct InviteMail {
    pub to: String,
    pub club_name: String,
    pub role: Role,
    pub token: InviteToken,
}

/// 招待の通知を外部の配送手段に渡す。
/// 配送の失敗は発行済みの招待をロールバックしない
#[async_trait]
pub trait InviteNotifier: Send + Sync {
    async fn notify(&self, mail: InviteMail) -> AppResult<()>;
}
