use async_trait::async_trait;
use chrono::Utc;
use derive_new::new;
use kernel::model::{
    id::UserId,
    invitation::{
        event::{ConsumeForExistingUser, ConsumeForNewUser, CreateInvitation},
        ConsumedInvite, Invitation, InviteDetails, InviteToken,
    },
};
use kernel::repository::invitation::InvitationRepository;
use shared::error::{AppError, AppResult};

use crate::database::{
    model::invitation::{
        parse_role, ConsumedInvitationRow, InvitationRow, InvitationStateRow, InviteDetailsRow,
    },
    ConnectionPool,
};

#[derive(new)]
pub struct InvitationRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl InvitationRepository for InvitationRepositoryImpl {
    // 招待を発行する
    async fn create(&self, event: CreateInvitation) -> AppResult<Invitation> {
        // 発行先のクラブが存在するかを先に確認する
        let club: Option<(i64,)> = sqlx::query_as(
            r#"
                SELECT 1::bigint
                FROM clubs
                WHERE club_id = $1
            "#,
        )
        .bind(event.club_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if club.is_none() {
            return Err(AppError::EntityNotFound(format!(
                "クラブ（{}）が見つかりませんでした。",
                event.club_id
            )));
        }

        let token = InviteToken::generate();
        let expires_at = Utc::now() + event.ttl;

        let row: InvitationRow = sqlx::query_as(
            r#"
                INSERT INTO invitations (token, email, club_id, role_name, expires_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING invitation_id, token, email, club_id, role_name,
                          created_at, expires_at, consumed_at
            "#,
        )
        .bind(&token)
        .bind(event.email.to_ascii_lowercase())
        .bind(event.club_id)
        .bind(event.role.as_ref())
        .bind(expires_at)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.try_into()
    }

    // トークンから招待の表示情報を取得する。読み取りのみで何も書き換えない
    async fn find_details_by_token(&self, token: &InviteToken) -> AppResult<InviteDetails> {
        let row: Option<InviteDetailsRow> = sqlx::query_as(
            r#"
                SELECT c.club_name, i.role_name, i.email, i.expires_at, i.consumed_at
                FROM invitations AS i
                INNER JOIN clubs AS c ON i.club_id = c.club_id
                WHERE i.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Err(not_found());
        };
        // 期限切れの判定は消費済みの判定より先に行う
        if row.expires_at <= Utc::now() {
            return Err(AppError::InviteExpired);
        }
        if row.consumed_at.is_some() {
            return Err(AppError::InviteAlreadyConsumed);
        }

        row.into_details()
    }

    // 新規ユーザーパス。
    // 招待の消費・ユーザー作成・クラブへの紐付けをすべて
    // 1 つのトランザクションで行い、途中で失敗した場合は全体を巻き戻す
    async fn consume_for_new_user(&self, event: ConsumeForNewUser) -> AppResult<ConsumedInvite> {
        let mut tx = self.db.begin().await?;

        // 書き込み前の検証。ここで弾いた場合は副作用を一切残さない
        {
            let row: Option<InvitationRow> = sqlx::query_as(
                r#"
                    SELECT invitation_id, token, email, club_id, role_name,
                           created_at, expires_at, consumed_at
                    FROM invitations
                    WHERE token = $1
                "#,
            )
            .bind(&event.token)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let Some(row) = row else {
                return Err(not_found());
            };
            if row.expires_at <= Utc::now() {
                return Err(AppError::InviteExpired);
            }
            if row.consumed_at.is_some() {
                return Err(AppError::InviteAlreadyConsumed);
            }
            if !row.email.eq_ignore_ascii_case(&event.user.email) {
                return Err(AppError::EmailMismatch);
            }
        }

        // 消費の本体。検証と消費を分けた read-then-write にはせず、
        // 条件付き UPDATE 1 文で未消費・期限内のときだけ消費が成立する
        let consumed = self.mark_consumed(&mut tx, &event.token).await?;
        let Some(consumed) = consumed else {
            return Err(self.unusable_invite_error(&event.token).await?);
        };
        let role = parse_role(&consumed.role_name)?;

        // 認証用のパスワードハッシュごとユーザーを作成する
        let user_id = UserId::new();
        let password_hash = bcrypt::hash(&event.user.password, bcrypt::DEFAULT_COST)?;
        sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role_name)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(&event.user.user_name)
        .bind(event.user.email.to_ascii_lowercase())
        .bind(password_hash)
        .bind(consumed.role_name.as_str())
        .execute(&mut *tx)
        .await
        .map_err(AppError::RegistrationFailed)?;

        sqlx::query(
            r#"
                INSERT INTO club_leaders (user_id, club_id)
                VALUES ($1, $2)
            "#,
        )
        .bind(user_id)
        .bind(consumed.club_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::RegistrationFailed)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(ConsumedInvite {
            user_id,
            club_id: consumed.club_id,
            role,
        })
    }

    // 既存ユーザーパス。認証は呼び出し側で済んでいる前提で、
    // 招待の消費と紐付けのみを 1 つのトランザクションで行う
    async fn consume_for_existing_user(
        &self,
        event: ConsumeForExistingUser,
    ) -> AppResult<ConsumedInvite> {
        let mut tx = self.db.begin().await?;

        let consumed = self.mark_consumed(&mut tx, &event.token).await?;
        let Some(consumed) = consumed else {
            return Err(self.unusable_invite_error(&event.token).await?);
        };
        let role = parse_role(&consumed.role_name)?;

        // すでに同じクラブに紐付いている場合は重複行を作らず成功とする
        sqlx::query(
            r#"
                INSERT INTO club_leaders (user_id, club_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, club_id) DO NOTHING
            "#,
        )
        .bind(event.user_id)
        .bind(consumed.club_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(ConsumedInvite {
            user_id: event.user_id,
            club_id: consumed.club_id,
            role,
        })
    }
}

impl InvitationRepositoryImpl {
    // 消費のコア。条件付き UPDATE なので同じトークンに対して
    // 同時に呼ばれても成立するのは 1 回だけで、敗者には None が返る
    async fn mark_consumed(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        token: &InviteToken,
    ) -> AppResult<Option<ConsumedInvitationRow>> {
        sqlx::query_as(
            r#"
                UPDATE invitations
                SET consumed_at = CURRENT_TIMESTAMP
                WHERE token = $1
                  AND consumed_at IS NULL
                  AND expires_at > CURRENT_TIMESTAMP
                RETURNING club_id, role_name
            "#,
        )
        .bind(token)
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)
    }

    // 条件付き UPDATE が 0 行だったときに失敗理由を切り分ける。
    // ここは診断のための読み取りで、消費の成否は上の UPDATE だけで決まる
    async fn unusable_invite_error(&self, token: &InviteToken) -> AppResult<AppError> {
        let row: Option<InvitationStateRow> = sqlx::query_as(
            r#"
                SELECT expires_at, consumed_at
                FROM invitations
                WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(match row {
            None => not_found(),
            Some(row) if row.expires_at <= Utc::now() => AppError::InviteExpired,
            Some(row) if row.consumed_at.is_some() => AppError::InviteAlreadyConsumed,
            Some(_) => AppError::NoRowsAffectedError(
                "No invitation record has been consumed".into(),
            ),
        })
    }
}

fn not_found() -> AppError {
    AppError::EntityNotFound("指定された招待が見つかりませんでした。".into())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use kernel::model::{
        club::event::CreateClub,
        id::ClubId,
        role::Role,
        user::event::CreateUserFromInvite,
    };
    use kernel::repository::club::ClubRepository;

    use super::*;
    use crate::repository::club::ClubRepositoryImpl;

    async fn seed_club(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<ClubId> {
        let repo = ClubRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        Ok(repo.create(CreateClub::new(name.into())).await?)
    }

    async fn seed_user(pool: &sqlx::PgPool, email: &str) -> anyhow::Result<UserId> {
        let user_id = UserId::new();
        sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role_name)
                VALUES ($1, $2, $3, $4, 'admin')
            "#,
        )
        .bind(user_id)
        .bind("Existing User")
        .bind(email)
        .bind(bcrypt::hash("passw0rd", bcrypt::DEFAULT_COST)?)
        .execute(pool)
        .await?;
        Ok(user_id)
    }

    async fn count_rows(pool: &sqlx::PgPool, table: &str) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    fn new_user_event(token: &InviteToken, email: &str) -> ConsumeForNewUser {
        ConsumeForNewUser::new(
            token.clone(),
            CreateUserFromInvite::new("Hanako Yamada".into(), email.into(), "secret".into()),
        )
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_issue_then_validate(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool));

        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "a@x.com".into(),
                Role::Admin,
                Duration::days(7),
            ))
            .await?;
        assert!(invitation.consumed_at.is_none());

        let details = repo.find_details_by_token(&invitation.token).await?;
        assert_eq!(details.club_name, "天文部");
        assert_eq!(details.role, Role::Admin);
        assert_eq!(details.email, "a@x.com");

        // 読み取りは冪等で、繰り返し呼んでも同じ結果が返る
        let again = repo.find_details_by_token(&invitation.token).await?;
        assert_eq!(details, again);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_validate_unknown_token(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool));
        let err = repo
            .find_details_by_token(&InviteToken::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_expired_invite_is_rejected_everywhere(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        let user_id = seed_user(&pool, "existing@x.com").await?;
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        // 期限切れの招待を直接作る
        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "a@x.com".into(),
                Role::Admin,
                Duration::seconds(-1),
            ))
            .await?;

        let err = repo.find_details_by_token(&invitation.token).await.unwrap_err();
        assert!(matches!(err, AppError::InviteExpired));

        let err = repo
            .consume_for_new_user(new_user_event(&invitation.token, "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InviteExpired));

        let err = repo
            .consume_for_existing_user(ConsumeForExistingUser::new(
                invitation.token.clone(),
                user_id,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InviteExpired));

        // 新規ユーザーは作られていない
        assert_eq!(count_rows(&pool, "users").await?, 1);
        assert_eq!(count_rows(&pool, "club_leaders").await?, 0);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_expiry_takes_precedence_over_consumed(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        let user_id = seed_user(&pool, "existing@x.com").await?;
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "existing@x.com".into(),
                Role::Admin,
                Duration::days(7),
            ))
            .await?;

        repo.consume_for_existing_user(ConsumeForExistingUser::new(
            invitation.token.clone(),
            user_id,
        ))
        .await?;

        // 消費済みのトークンの期限を過去に倒す
        sqlx::query(
            r#"
                UPDATE invitations
                SET expires_at = CURRENT_TIMESTAMP - INTERVAL '1 second'
                WHERE token = $1
            "#,
        )
        .bind(&invitation.token)
        .execute(&pool)
        .await?;

        // 消費済みかどうかに関わらず、期限切れが先に報告される
        let err = repo.find_details_by_token(&invitation.token).await.unwrap_err();
        assert!(matches!(err, AppError::InviteExpired));

        let err = repo
            .consume_for_new_user(new_user_event(&invitation.token, "existing@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InviteExpired));

        let err = repo
            .consume_for_existing_user(ConsumeForExistingUser::new(
                invitation.token.clone(),
                user_id,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InviteExpired));

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_binding_failure_rolls_back_user_and_consumption(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "a@x.com".into(),
                Role::Admin,
                Duration::days(7),
            ))
            .await?;

        // ユーザー作成の後に来る紐付けの INSERT だけを失敗させる
        sqlx::query(
            r#"
                CREATE FUNCTION reject_club_leaders() RETURNS trigger AS $$
                BEGIN
                    RAISE EXCEPTION 'club_leaders insert rejected';
                END;
                $$ LANGUAGE plpgsql
            "#,
        )
        .execute(&pool)
        .await?;
        sqlx::query(
            r#"
                CREATE TRIGGER reject_club_leaders_insert
                BEFORE INSERT ON club_leaders
                FOR EACH ROW EXECUTE FUNCTION reject_club_leaders()
            "#,
        )
        .execute(&pool)
        .await?;

        let err = repo
            .consume_for_new_user(new_user_event(&invitation.token, "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RegistrationFailed(_)));

        // ロールバックによりユーザーも紐付けも残らず、招待も未消費のまま
        assert_eq!(count_rows(&pool, "users").await?, 0);
        assert_eq!(count_rows(&pool, "club_leaders").await?, 0);
        assert!(repo.find_details_by_token(&invitation.token).await.is_ok());

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_email_mismatch_leaves_no_rows(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "a@x.com".into(),
                Role::Admin,
                Duration::days(7),
            ))
            .await?;

        let err = repo
            .consume_for_new_user(new_user_event(&invitation.token, "b@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmailMismatch));

        assert_eq!(count_rows(&pool, "users").await?, 0);
        assert_eq!(count_rows(&pool, "club_leaders").await?, 0);
        // 招待は未消費のまま
        assert!(repo.find_details_by_token(&invitation.token).await.is_ok());

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_email_match_is_case_insensitive(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "A@X.com".into(),
                Role::SuperAdmin,
                Duration::days(7),
            ))
            .await?;

        let consumed = repo
            .consume_for_new_user(new_user_event(&invitation.token, "a@x.com"))
            .await?;
        assert_eq!(consumed.club_id, club_id);
        assert_eq!(consumed.role, Role::SuperAdmin);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_register_from_invite_binds_and_consumes(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "a@x.com".into(),
                Role::Admin,
                Duration::days(7),
            ))
            .await?;

        let consumed = repo
            .consume_for_new_user(new_user_event(&invitation.token, "a@x.com"))
            .await?;
        assert_eq!(consumed.club_id, club_id);
        assert_eq!(consumed.role, Role::Admin);

        assert_eq!(count_rows(&pool, "users").await?, 1);
        assert_eq!(count_rows(&pool, "club_leaders").await?, 1);

        // 消費後の再検証は AlreadyConsumed になる
        let err = repo.find_details_by_token(&invitation.token).await.unwrap_err();
        assert!(matches!(err, AppError::InviteAlreadyConsumed));

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_duplicate_email_rolls_back_everything(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        seed_user(&pool, "a@x.com").await?;
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "a@x.com".into(),
                Role::Admin,
                Duration::days(7),
            ))
            .await?;

        // users.email の一意制約違反でユーザー作成が失敗する
        let err = repo
            .consume_for_new_user(new_user_event(&invitation.token, "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RegistrationFailed(_)));

        // ロールバックにより追加のユーザーも紐付けも消費状態も残らない
        assert_eq!(count_rows(&pool, "users").await?, 1);
        assert_eq!(count_rows(&pool, "club_leaders").await?, 0);
        assert!(repo.find_details_by_token(&invitation.token).await.is_ok());

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_concurrent_consumption_has_single_winner(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        let first = seed_user(&pool, "first@x.com").await?;
        let second = seed_user(&pool, "second@x.com").await?;
        let repo = Arc::new(InvitationRepositoryImpl::new(ConnectionPool::new(
            pool.clone(),
        )));

        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "a@x.com".into(),
                Role::Admin,
                Duration::days(7),
            ))
            .await?;

        let (res_a, res_b) = tokio::join!(
            {
                let repo = Arc::clone(&repo);
                let token = invitation.token.clone();
                async move {
                    repo.consume_for_existing_user(ConsumeForExistingUser::new(token, first))
                        .await
                }
            },
            {
                let repo = Arc::clone(&repo);
                let token = invitation.token.clone();
                async move {
                    repo.consume_for_existing_user(ConsumeForExistingUser::new(token, second))
                        .await
                }
            },
        );

        // 成功はちょうど 1 件、敗者は AlreadyConsumed
        let succeeded = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(succeeded, 1);
        let failure = [res_a, res_b]
            .into_iter()
            .find_map(Result::err)
            .expect("one attempt must fail");
        assert!(matches!(failure, AppError::InviteAlreadyConsumed));

        assert_eq!(count_rows(&pool, "club_leaders").await?, 1);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_retried_assignment_does_not_duplicate_binding(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let club_id = seed_club(&pool, "天文部").await?;
        let user_id = seed_user(&pool, "existing@x.com").await?;
        let repo = InvitationRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let invitation = repo
            .create(CreateInvitation::new(
                club_id,
                "existing@x.com".into(),
                Role::Admin,
                Duration::days(7),
            ))
            .await?;

        repo.consume_for_existing_user(ConsumeForExistingUser::new(
            invitation.token.clone(),
            user_id,
        ))
        .await?;

        // 成功後のクリック再送。トークンは単回使用なので消費済みエラーになるが、
        // 紐付けが重複することはない
        let err = repo
            .consume_for_existing_user(ConsumeForExistingUser::new(
                invitation.token.clone(),
                user_id,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InviteAlreadyConsumed));
        assert_eq!(count_rows(&pool, "club_leaders").await?, 1);

        Ok(())
    }
}
