use crate::errors::{RepoError, UploadError};
use crate::models::{ImageUpload, NewWish, WishRecord};
use async_trait::async_trait;

/// Folder on the media host that every submitted image lands in.
pub const UPLOAD_FOLDER: &str = "birthday_wishes";

/// Trait defining operations for storing and retrieving wish records.
#[async_trait]
pub trait WishRepository: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Retrieves a wish by the raw id taken from the request path.
    /// The id is handed to the store as a bound parameter without coercion.
    /// Returns Ok(None) if no row matches.
    async fn get_by_id(&self, id: &str) -> Result<Option<WishRecord>, RepoError>;

    /// Inserts a new wish and returns the id assigned by the store.
    async fn create(&self, wish: &NewWish) -> Result<i64, RepoError>;

    /// Round-trips a trivial query to check the store is reachable.
    async fn ping(&self) -> Result<(), RepoError>;
}

/// Trait defining the media host that receives wish images.
#[async_trait]
pub trait MediaUploader: Send + Sync + 'static {
    /// Stores the image under `folder` and returns its public (secure) URL.
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, UploadError>;
}
