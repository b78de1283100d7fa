use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::auth::event::CreateToken;
use kernel::model::id::ClubId;
use kernel::model::invitation::{
    event::{ConsumeForExistingUser, ConsumeForNewUser, CreateInvitation},
    InviteToken,
};
use kernel::notifier::InviteMail;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::invitation::{
        AssignInviteRequest, ConsumedInviteResponse, CreateInvitationRequest,
        InvitationResponse, InviteDetailsResponse, RegisterFromInviteRequest,
    },
};

/// 招待を発行する。
/// スーパー管理者は任意のクラブに、管理者は自分がリーダーの
/// クラブにのみ発行できる
pub async fn create_invitation(
    user: AuthorizedUser,
    Path(club_id): Path<ClubId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateInvitationRequest>,
) -> AppResult<(StatusCode, Json<InvitationResponse>)> {
    if !user.is_super_admin() {
        let leading = registry
            .membership_repository()
            .leadership_clubs_for(user.id())
            .await?;
        if !leading.contains(&club_id) {
            return Err(AppError::ForbiddenOperation);
        }
    }
    req.validate(&())?;

    let club = registry
        .club_repository()
        .find_by_id(club_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("クラブ（{club_id}）が見つかりませんでした。"))
        })?;

    let invitation = registry
        .invitation_repository()
        .create(CreateInvitation::new(
            club_id,
            req.email.clone(),
            req.role.into(),
            registry.invitation_ttl(),
        ))
        .await?;

    // メール配送は fire-and-forget。失敗しても発行済みの招待は取り消さない
    let notifier = registry.invite_notifier();
    let mail = InviteMail {
        to: req.email,
        club_name: club.club_name,
        role: invitation.role,
        token: invitation.token.clone(),
    };
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(mail).await {
            tracing::warn!(
                error.cause_chain = ?e,
                "failed to deliver invite mail"
            );
        }
    });

    Ok((StatusCode::CREATED, Json(invitation.into())))
}

/// 招待リンクの表示情報を返す。読み取りのみ
pub async fn show_invitation(
    Path(token): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<InviteDetailsResponse>> {
    registry
        .invitation_repository()
        .find_details_by_token(&InviteToken(token))
        .await
        .map(InviteDetailsResponse::from)
        .map(Json)
}

/// 新規ユーザーパス。アカウントを作成し、クラブへの紐付けと
/// 招待の消費までをまとめて行う
pub async fn register_from_invite(
    Path(token): Path<String>,
    State(registry): State<AppRegistry>,
    Json(req): Json<RegisterFromInviteRequest>,
) -> AppResult<(StatusCode, Json<ConsumedInviteResponse>)> {
    req.validate(&())?;
    if req.password != req.confirm_password {
        return Err(AppError::UnprocessableEntity(
            "パスワードが一致しません。".into(),
        ));
    }

    let consumed = registry
        .invitation_repository()
        .consume_for_new_user(ConsumeForNewUser::new(InviteToken(token), req.into()))
        .await?;

    // 登録が確定してからセッションを発行する
    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(consumed.user_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ConsumedInviteResponse::new(access_token.0, &consumed)),
    ))
}

/// 既存ユーザーパス。認証してからクラブへの紐付けと招待の消費を行う
pub async fn assign_invite(
    Path(token): Path<String>,
    State(registry): State<AppRegistry>,
    Json(req): Json<AssignInviteRequest>,
) -> AppResult<Json<ConsumedInviteResponse>> {
    req.validate(&())?;

    let user_id = registry
        .auth_repository()
        .verify_user(&req.email, &req.password)
        .await?;

    let consumed = registry
        .invitation_repository()
        .consume_for_existing_user(ConsumeForExistingUser::new(InviteToken(token), user_id))
        .await?;

    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(consumed.user_id))
        .await?;

    Ok(Json(ConsumedInviteResponse::new(access_token.0, &consumed)))
}
