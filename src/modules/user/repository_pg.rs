use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::InsertUser, repository::UserRepository, schema::UserEntity},
};

#[derive(Clone)]
pub struct UserPgRepository {
    pool: sqlx::PgPool,
}

impl UserPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserPgRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn count(&self) -> Result<i64, error::SystemError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?;
        Ok(count)
    }
}
