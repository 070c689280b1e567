use serde::{Deserialize, Serialize};

/// A row of the `users` table. Field names match the column names so the
/// record serializes exactly as stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WishRecord {
    pub id: i64,
    pub name: Option<String>,
    pub message: Option<String>,
    pub image: String,
}

/// Values inserted by `POST /submit`; `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWish {
    pub name: Option<String>,
    pub message: Option<String>,
    pub image: String,
}

/// Raw image taken from the multipart body, buffered fully in memory.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub image: String,
}

impl SubmitResponse {
    pub fn saved(image: String) -> Self {
        Self {
            success: true,
            message: "Wish saved!".to_string(),
            image,
        }
    }
}
