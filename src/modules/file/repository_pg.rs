use uuid::Uuid;

use crate::{
    api::error,
    modules::file::{
        model::InsertFile,
        repository::{FileRepository, PAGE_SIZE},
        schema::FileEntity,
    },
};

#[derive(Clone)]
pub struct FilePgRepository {
    pool: sqlx::PgPool,
}

impl FilePgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileRepository for FilePgRepository {
    async fn insert(&self, file: &InsertFile) -> Result<FileEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let entity = sqlx::query_as::<_, FileEntity>(
            r#"
            INSERT INTO files (id, owner_id, name, kind, parent_id, is_public, content_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(file.owner_id)
        .bind(&file.name)
        .bind(file.kind)
        .bind(file.parent_id)
        .bind(file.is_public)
        .bind(&file.content_ref)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    async fn find_owned(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            "SELECT * FROM files WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn find_public_or_owned(
        &self,
        id: &Uuid,
        requester: Option<&Uuid>,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        // owner_id = NULL never matches, so anonymous readers only see
        // public records
        let file = sqlx::query_as::<_, FileEntity>(
            "SELECT * FROM files WHERE id = $1 AND (is_public OR owner_id = $2)",
        )
        .bind(id)
        .bind(requester)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn list_children(
        &self,
        owner_id: &Uuid,
        parent_id: Option<&Uuid>,
        page: i64,
    ) -> Result<Vec<FileEntity>, error::SystemError> {
        let files = sqlx::query_as::<_, FileEntity>(
            r#"
            SELECT * FROM files
            WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2
            ORDER BY created_at, id
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(page * PAGE_SIZE)
        .bind(PAGE_SIZE)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn set_visibility(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
        is_public: bool,
    ) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            "UPDATE files SET is_public = $3 WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(is_public)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn count(&self) -> Result<i64, error::SystemError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM files").fetch_one(&self.pool).await?;
        Ok(count)
    }
}
