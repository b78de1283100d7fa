use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::{ClubId, UserId};
use kernel::repository::membership::MembershipRepository;
use shared::error::{AppError, AppResult};

use crate::database::ConnectionPool;

#[derive(new)]
pub struct MembershipRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl MembershipRepository for MembershipRepositoryImpl {
    async fn bind(&self, user_id: UserId, club_id: ClubId) -> AppResult<()> {
        // 二重送信や再試行を許容するため、既存の紐付けは黙って成功扱いにする
        sqlx::query(
            r#"
                INSERT INTO club_leaders (user_id, club_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, club_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(club_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(())
    }

    async fn leadership_clubs_for(&self, user_id: UserId) -> AppResult<Vec<ClubId>> {
        let rows: Vec<(ClubId,)> = sqlx::query_as(
            r#"
                SELECT club_id
                FROM club_leaders
                WHERE user_id = $1
                ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(|(club_id,)| club_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use kernel::model::{club::event::CreateClub, role::Role};
    use kernel::repository::club::ClubRepository;

    use super::*;
    use crate::repository::club::ClubRepositoryImpl;

    async fn insert_user(pool: &sqlx::PgPool, email: &str, role: Role) -> anyhow::Result<UserId> {
        let user_id = UserId::new();
        sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role_name)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind("Test User")
        .bind(email)
        .bind(bcrypt::hash("passw0rd", bcrypt::DEFAULT_COST)?)
        .bind(role.as_ref())
        .execute(pool)
        .await?;
        Ok(user_id)
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_bind_is_idempotent(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let club_repo = ClubRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let repo = MembershipRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let club_id = club_repo.create(CreateClub::new("囲碁部".into())).await?;
        let user_id = insert_user(&pool, "leader@example.com", Role::Admin).await?;

        repo.bind(user_id, club_id).await?;
        // 同じ組に対する再度の bind はエラーにならない
        repo.bind(user_id, club_id).await?;

        let clubs = repo.leadership_clubs_for(user_id).await?;
        assert_eq!(clubs, vec![club_id]);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn test_leadership_clubs_reflect_new_bindings(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let club_repo = ClubRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let repo = MembershipRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let user_id = insert_user(&pool, "leader@example.com", Role::Admin).await?;
        assert!(repo.leadership_clubs_for(user_id).await?.is_empty());

        let first = club_repo.create(CreateClub::new("茶道部".into())).await?;
        repo.bind(user_id, first).await?;
        assert_eq!(repo.leadership_clubs_for(user_id).await?, vec![first]);

        let second = club_repo.create(CreateClub::new("写真部".into())).await?;
        repo.bind(user_id, second).await?;
        assert_eq!(
            repo.leadership_clubs_for(user_id).await?,
            vec![first, second]
        );

        Ok(())
    }
}
