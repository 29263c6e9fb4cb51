use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::file::schema::{FileEntity, FileKind};
use crate::utils::de_parent_id;

/// Field presence is checked in the service so the API can answer with the
/// exact field that was left out. `type` stays loose on purpose: unknown
/// values must read as "Missing type", not as a deserialization failure.
#[derive(Deserialize, Validate)]
pub struct UploadModel {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de_parent_id")]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub is_public: bool,
    /// Base64-encoded content, required unless `type` is `folder`.
    pub data: Option<String>,
}

pub struct InsertFile {
    pub owner_id: Uuid,
    pub name: String,
    pub kind: FileKind,
    pub parent_id: Option<Uuid>,
    pub is_public: bool,
    pub content_ref: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct ListQuery {
    #[serde(default, deserialize_with = "de_parent_id")]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub page: i64,
}

#[derive(Deserialize, Validate)]
pub struct ReadQuery {
    /// Thumbnail width; reads the `{content_ref}_{size}` variant.
    pub size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub kind: FileKind,
    pub is_public: bool,
    pub parent_id: Option<Uuid>,
}

impl From<FileEntity> for FileResponse {
    fn from(entity: FileEntity) -> Self {
        FileResponse {
            id: entity.id,
            owner_id: entity.owner_id,
            name: entity.name,
            kind: entity.kind,
            is_public: entity.is_public,
            parent_id: entity.parent_id,
        }
    }
}
