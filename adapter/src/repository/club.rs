use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    club::{event::CreateClub, Club},
    id::ClubId,
};
use kernel::repository::club::ClubRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::club::ClubRow, ConnectionPool};

#[derive(new)]
pub struct ClubRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ClubRepository for ClubRepositoryImpl {
    async fn create(&self, event: CreateClub) -> AppResult<ClubId> {
        let club_id = ClubId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO clubs (club_id, club_name)
                VALUES ($1, $2)
            "#,
        )
        .bind(club_id)
        .bind(event.club_name)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No club record has been created".into(),
            ));
        }

        Ok(club_id)
    }

    async fn find_all(&self) -> AppResult<Vec<Club>> {
        let rows: Vec<ClubRow> = sqlx::query_as(
            r#"
                SELECT club_id, club_name, created_at
                FROM clubs
                ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Club::from).collect())
    }

    async fn find_by_id(&self, club_id: ClubId) -> AppResult<Option<Club>> {
        let row: Option<ClubRow> = sqlx::query_as(
            r#"
                SELECT club_id, club_name, created_at
                FROM clubs
                WHERE club_id = $1
            "#,
        )
        .bind(club_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Club::from))
    }
}
