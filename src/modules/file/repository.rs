use uuid::Uuid;

use crate::{
    api::error,
    modules::file::{model::InsertFile, schema::FileEntity},
};

pub const PAGE_SIZE: i64 = 20;

#[async_trait::async_trait]
pub trait FileRepository {
    async fn insert(&self, file: &InsertFile) -> Result<FileEntity, error::SystemError>;
    /// Unscoped lookup, used for parent validation only.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<FileEntity>, error::SystemError>;
    /// `None` covers both absence and ownership mismatch.
    async fn find_owned(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
    ) -> Result<Option<FileEntity>, error::SystemError>;
    /// Like `find_owned` but also matches public records; the content-read
    /// path is the only caller.
    async fn find_public_or_owned(
        &self,
        id: &Uuid,
        requester: Option<&Uuid>,
    ) -> Result<Option<FileEntity>, error::SystemError>;
    /// Fixed pages of `PAGE_SIZE` in insertion order; out-of-range pages are
    /// empty, never an error.
    async fn list_children(
        &self,
        owner_id: &Uuid,
        parent_id: Option<&Uuid>,
        page: i64,
    ) -> Result<Vec<FileEntity>, error::SystemError>;
    async fn set_visibility(
        &self,
        id: &Uuid,
        owner_id: &Uuid,
        is_public: bool,
    ) -> Result<Option<FileEntity>, error::SystemError>;
    async fn count(&self) -> Result<i64, error::SystemError>;
}
