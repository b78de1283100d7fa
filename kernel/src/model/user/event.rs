use derive_new::new;

/// 招待経由の新規登録で作成されるユーザー。
/// 付与するロールは招待に記録されたものを使う
#[derive(new)]
pub struct CreateUserFromInvite {
    pub user_name: String,
    pub email: String,
    pub password: String,
}
