use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "file_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Folder,
    File,
    Image,
}

impl std::str::FromStr for FileKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(FileKind::Folder),
            "file" => Ok(FileKind::File),
            "image" => Ok(FileKind::Image),
            _ => Err(()),
        }
    }
}

/// `parent_id = NULL` is the root sentinel. `content_ref` points into the
/// content store and is only present for file/image records.
#[derive(Debug, Clone, FromRow)]
pub struct FileEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub kind: FileKind,
    pub parent_id: Option<Uuid>,
    pub is_public: bool,
    pub content_ref: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
