use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::id::ClubId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::club::{ClubResponse, ClubsResponse, CreateClubRequest},
};

pub async fn register_club(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateClubRequest>,
) -> AppResult<StatusCode> {
    // クラブの作成はスーパー管理者に限る
    if !user.is_super_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate(&())?;

    registry
        .club_repository()
        .create(req.into())
        .await
        .map(|_| StatusCode::CREATED)
}

pub async fn show_club_list(
    _user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ClubsResponse>> {
    registry
        .club_repository()
        .find_all()
        .await
        .map(ClubsResponse::from)
        .map(Json)
}

pub async fn show_club(
    _user: AuthorizedUser,
    Path(club_id): Path<ClubId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ClubResponse>> {
    registry
        .club_repository()
        .find_by_id(club_id)
        .await
        .and_then(|club| match club {
            Some(club) => Ok(Json(club.into())),
            None => Err(AppError::EntityNotFound("not found".into())),
        })
}
