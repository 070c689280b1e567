#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use birthday_wishes::{
    domain::{MediaUploader, WishRepository},
    errors::{RepoError, UploadError},
    models::{ImageUpload, NewWish, WishRecord},
    routes::{create_router, RouterOptions},
    AppState,
};
use http_body_util::BodyExt;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tower::ServiceExt;

pub const BOUNDARY: &str = "wish-boundary-7MA4YWxkTrZu0gW";

/// In-memory `users` table with call counters.
#[derive(Default)]
pub struct MockWishRepository {
    rows: Mutex<Vec<WishRecord>>,
    pub inserts: Mutex<Vec<NewWish>>,
    pub get_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub ping_calls: AtomicUsize,
    pub fail_reads: bool,
    pub fail_inserts: bool,
}

impl MockWishRepository {
    pub fn with_rows(rows: Vec<WishRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Default::default()
        }
    }

    pub fn failing_inserts() -> Self {
        Self {
            fail_inserts: true,
            ..Default::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst) + self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WishRepository for MockWishRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<WishRecord>, RepoError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(RepoError::BackendError(anyhow::anyhow!("connection refused")));
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|row| row.id.to_string() == id).cloned())
    }

    async fn create(&self, wish: &NewWish) -> Result<i64, RepoError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.inserts.lock().unwrap().push(wish.clone());
        if self.fail_inserts {
            return Err(RepoError::BackendError(anyhow::anyhow!("relation \"users\" does not exist")));
        }
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        rows.push(WishRecord {
            id,
            name: wish.name.clone(),
            message: wish.message.clone(),
            image: wish.image.clone(),
        });
        Ok(id)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(RepoError::BackendError(anyhow::anyhow!("connection refused")));
        }
        Ok(())
    }
}

/// Media host stand-in that answers with a fixed URL or a failure.
pub struct MockMediaUploader {
    url: Option<String>,
    pub calls: AtomicUsize,
    pub uploads: Mutex<Vec<(String, ImageUpload)>>,
}

impl MockMediaUploader {
    pub fn returning(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            calls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            url: None,
            calls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaUploader for MockMediaUploader {
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.uploads.lock().unwrap().push((folder.to_string(), image));
        match &self.url {
            Some(url) => Ok(url.clone()),
            None => Err(UploadError::Rejected("Invalid image file".to_string())),
        }
    }
}

pub fn router(wishes: Arc<MockWishRepository>, media: Arc<MockMediaUploader>) -> Router {
    router_with_options(wishes, media, &RouterOptions::default())
}

pub fn router_with_options(
    wishes: Arc<MockWishRepository>,
    media: Arc<MockMediaUploader>,
    options: &RouterOptions,
) -> Router {
    let state = Arc::new(AppState::new(wishes, media));
    create_router(state, options)
}

/// One part of a multipart body.
pub enum FormPart<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn cake_png<'a>() -> FormPart<'a> {
    FormPart::File {
        name: "image",
        file_name: "cake.png",
        content_type: "image/png",
        data: &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    }
}

pub async fn send_multipart(router: &Router, parts: &[FormPart<'_>]) -> Response {
    let request = Request::builder()
        .uri("/submit")
        .method("POST")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn send_get(router: &Router, route: &str) -> Response {
    let request = Request::builder()
        .uri(route)
        .method("GET")
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}
