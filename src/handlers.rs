use crate::{
    domain::UPLOAD_FOLDER,
    errors::AppError,
    models::{ImageUpload, NewWish, SubmitResponse, WishRecord},
    AppState,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use tracing;

/// Handler for GET /
pub async fn hello() -> &'static str {
    "Hello World"
}

/// Handler for GET /birthday/{id}
pub async fn get_birthday(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WishRecord>, AppError> {
    tracing::info!(birthday_id = %id, "Fetching birthday");
    match state.wishes.get_by_id(&id).await? {
        Some(wish) => {
            tracing::debug!(birthday_id = %id, ?wish, "Birthday found");
            Ok(Json(wish))
        }
        None => Err(AppError::BirthdayNotFound(id)),
    }
}

/// Fields collected from the `POST /submit` form.
#[derive(Debug, Default)]
struct SubmitForm {
    name: Option<String>,
    message: Option<String>,
    image: Option<ImageUpload>,
}

async fn read_submit_form(mut multipart: Multipart) -> Result<SubmitForm, AppError> {
    let mut form = SubmitForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        match field_name.as_str() {
            "name" => form.name = Some(field.text().await?),
            "message" => form.message = Some(field.text().await?),
            "image" => {
                // Only a part carrying a file name counts as an uploaded file.
                let file_name = match field.file_name() {
                    Some(name) if !name.is_empty() => name.to_string(),
                    _ => {
                        tracing::debug!("Ignoring non-file image field");
                        continue;
                    }
                };
                if form.image.is_some() {
                    tracing::debug!(%file_name, "Ignoring additional image file");
                    continue;
                }
                let content_type = field.content_type().map(|m| m.to_string());
                let data = field.bytes().await?.to_vec();
                form.image = Some(ImageUpload {
                    data,
                    file_name: Some(file_name),
                    content_type,
                });
            }
            _ => tracing::debug!("Ignoring unknown multipart field: {}", field_name),
        }
    }

    Ok(form)
}

/// Handler for POST /submit
pub async fn submit_wish(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    tracing::info!("Request received at /submit");

    // A body that is not multipart at all simply carries no file.
    let form = match multipart {
        Ok(multipart) => read_submit_form(multipart).await?,
        Err(rejection) => {
            tracing::debug!(%rejection, "Submission is not a multipart form");
            SubmitForm::default()
        }
    };
    tracing::debug!(name = ?form.name, message = ?form.message, has_image = form.image.is_some(), "Parsed submission");

    let image = form.image.ok_or(AppError::NoImageUploaded)?;
    tracing::debug!(
        file_name = ?image.file_name,
        content_type = ?image.content_type,
        bytes = image.data.len(),
        "Uploading image"
    );

    let image_url = state.media.upload(UPLOAD_FOLDER, image).await?;
    tracing::info!(%image_url, "Image uploaded");

    let wish = NewWish {
        name: form.name,
        message: form.message,
        image: image_url,
    };
    // An insert failure leaves the uploaded image orphaned on the media host.
    let wish_id = state.wishes.create(&wish).await.inspect_err(|_| {
        tracing::warn!(image_url = %wish.image, "Wish insert failed after upload; image is orphaned");
    })?;

    tracing::info!(wish_id, "Wish saved successfully");
    Ok(Json(SubmitResponse::saved(wish.image)))
}
