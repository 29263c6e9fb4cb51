use log::info;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::api::error;
use crate::modules::file::model::{FileResponse, InsertFile, ListQuery, UploadModel};
use crate::modules::file::repository::FileRepository;
use crate::modules::file::schema::FileKind;
use crate::modules::file::store::ContentStore;
use crate::modules::thumbnail::model::ThumbnailJob;
use crate::modules::thumbnail::queue::ThumbnailQueue;

#[derive(Clone)]
pub struct FileService {
    repo: Arc<dyn FileRepository + Send + Sync>,
    store: ContentStore,
    jobs: Arc<dyn ThumbnailQueue + Send + Sync>,
}

impl FileService {
    pub fn with_dependencies(
        repo: Arc<dyn FileRepository + Send + Sync>,
        store: ContentStore,
        jobs: Arc<dyn ThumbnailQueue + Send + Sync>,
    ) -> Self {
        info!("FileService initialized with dependencies");
        FileService { repo, store, jobs }
    }

    async fn validate_parent(&self, parent_id: Option<&Uuid>) -> Result<(), error::SystemError> {
        let Some(parent_id) = parent_id else {
            // root sentinel
            return Ok(());
        };
        let parent =
            self.repo.find_by_id(parent_id).await?.ok_or(error::SystemError::ParentNotFound)?;
        if parent.kind != FileKind::Folder {
            return Err(error::SystemError::ParentNotAFolder);
        }
        Ok(())
    }

    /// Creates a folder or writes content and its record. The parent check
    /// and the insert are separate statements; a parent removed in between
    /// leaves a dangling reference (known gap, not papered over here).
    pub async fn upload(
        &self,
        owner_id: Uuid,
        model: UploadModel,
    ) -> Result<FileResponse, error::SystemError> {
        let Some(name) = model.name.filter(|n| !n.is_empty()) else {
            return Err(error::SystemError::MissingField("name"));
        };
        let kind = model
            .kind
            .as_deref()
            .and_then(|k| FileKind::from_str(k).ok())
            .ok_or(error::SystemError::MissingField("type"))?;

        // data presence is checked before the parent; an undecodable
        // payload counts as absent
        let bytes = if kind == FileKind::Folder {
            None
        } else {
            let data = model.data.ok_or(error::SystemError::MissingField("data"))?;
            let decoded = STANDARD
                .decode(data.as_bytes())
                .map_err(|_| error::SystemError::MissingField("data"))?;
            Some(decoded)
        };

        self.validate_parent(model.parent_id.as_ref()).await?;

        let Some(bytes) = bytes else {
            let record = self
                .repo
                .insert(&InsertFile {
                    owner_id,
                    name,
                    kind,
                    parent_id: model.parent_id,
                    is_public: model.is_public,
                    content_ref: None,
                })
                .await?;
            return Ok(FileResponse::from(record));
        };

        let content_ref = Uuid::now_v7().to_string();
        self.store.write(&content_ref, &bytes).await?;

        let record = self
            .repo
            .insert(&InsertFile {
                owner_id,
                name,
                kind,
                parent_id: model.parent_id,
                is_public: model.is_public,
                content_ref: Some(content_ref),
            })
            .await?;

        if record.kind == FileKind::Image {
            let job = ThumbnailJob::new(record.id, record.owner_id);
            if let Err(e) = self.jobs.submit(&job).await {
                // content and record are in place; variants can be
                // regenerated later
                log::error!("Failed to enqueue thumbnail job for file {}: {e}", record.id);
            }
        }

        Ok(FileResponse::from(record))
    }

    pub async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<FileResponse, error::SystemError> {
        let record = self
            .repo
            .find_owned(&id, &owner_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("no such file for this owner"))?;
        Ok(FileResponse::from(record))
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        query: ListQuery,
    ) -> Result<Vec<FileResponse>, error::SystemError> {
        let records =
            self.repo.list_children(&owner_id, query.parent_id.as_ref(), query.page).await?;
        Ok(records.into_iter().map(FileResponse::from).collect())
    }

    pub async fn set_visibility(
        &self,
        id: Uuid,
        owner_id: Uuid,
        is_public: bool,
    ) -> Result<FileResponse, error::SystemError> {
        let record = self
            .repo
            .set_visibility(&id, &owner_id, is_public)
            .await?
            .ok_or_else(|| error::SystemError::not_found("no such file for this owner"))?;
        Ok(FileResponse::from(record))
    }

    /// Content read with the visibility rule applied: owners always, anyone
    /// when public. `size` selects a thumbnail variant.
    pub async fn read_content(
        &self,
        id: Uuid,
        requester: Option<Uuid>,
        size: Option<u32>,
    ) -> Result<(Vec<u8>, mime_guess::Mime), error::SystemError> {
        let record = self
            .repo
            .find_public_or_owned(&id, requester.as_ref())
            .await?
            .ok_or_else(|| error::SystemError::not_found("file absent or not visible"))?;

        if record.kind == FileKind::Folder {
            return Err(error::SystemError::FolderHasNoContent);
        }

        let content_ref = record
            .content_ref
            .as_deref()
            .ok_or_else(|| error::SystemError::not_found("record carries no content"))?;

        let reference = match size {
            Some(size) => format!("{content_ref}_{size}"),
            None => content_ref.to_string(),
        };

        let bytes = self.store.read(&reference).await?;
        let mime = mime_guess::from_path(&record.name).first_or_octet_stream();

        Ok((bytes, mime))
    }

    pub async fn count(&self) -> Result<i64, error::SystemError> {
        self.repo.count().await
    }
}
