//! Birthday wishes backend: accepts a name, message and image, publishes the
//! image to a media host and keeps the record in a relational `users` table.

pub mod aws_clients;
pub mod cloudinary;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod startup;
pub mod storage;

use crate::domain::{MediaUploader, WishRepository};
use std::sync::Arc;

/// Collaborators shared by every request, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub wishes: Arc<dyn WishRepository>,
    pub media: Arc<dyn MediaUploader>,
}

impl AppState {
    pub fn new(wishes: Arc<dyn WishRepository>, media: Arc<dyn MediaUploader>) -> Self {
        Self { wishes, media }
    }
}
