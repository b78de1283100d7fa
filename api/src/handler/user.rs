use axum::{extract::State, Json};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::{extractor::AuthorizedUser, model::user::UserResponse};

pub async fn get_current_user(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UserResponse>> {
    // リーダーを務めるクラブの一覧も合わせて返す
    let clubs = registry
        .membership_repository()
        .leadership_clubs_for(user.id())
        .await?;
    Ok(Json(UserResponse::new(user.user, clubs)))
}
