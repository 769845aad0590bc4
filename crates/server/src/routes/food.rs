use std::path::Path;

use axum::{
    extract::{multipart::{Field, MultipartRejection}, rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use common::types::ApiResponse;
use serde::Deserialize;
use service::food::{domain::{FoodCandidate, FoodItem}, temp_file::TempUpload};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};
use uuid::Uuid;

use super::auth::{Caller, ServerState};
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct RemoveFoodInput {
    pub id: Uuid,
}

/// Reduce a client-supplied file name to a safe basename.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .take(100)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() { "upload".to_string() } else { cleaned.to_string() }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    debug!(err = %e, "multipart read failed");
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Image file is too large")
    } else {
        ApiError::bad_request("Invalid multipart body")
    }
}

/// Temp file name `<millis>_<uuid>_<name>`; unique per request even for identical uploads.
pub fn temp_file_name(original: &str) -> String {
    format!(
        "{}_{}_{}",
        chrono::Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize_file_name(original)
    )
}

/// Stream one file part into the uploads dir. Empty parts without a file name count as absent.
async fn spool_image(mut field: Field<'_>, dir: &Path) -> Result<Option<TempUpload>, ApiError> {
    let original = field.file_name().unwrap_or_default().to_string();
    let path = dir.join(temp_file_name(&original));

    // never reuse or truncate an existing file
    let open = tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await;
    let mut file = open.map_err(|e| {
        error!(path = %path.display(), err = %e, "could not create temporary upload");
        ApiError::internal()
    })?;
    let tmp = TempUpload::new(path);

    let mut written = 0usize;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                drop(file);
                tmp.release().await;
                return Err(multipart_error(e));
            }
        };
        if let Err(e) = file.write_all(&chunk).await {
            error!(path = %tmp.path().display(), err = %e, "could not write temporary upload");
            drop(file);
            tmp.release().await;
            return Err(ApiError::internal());
        }
        written += chunk.len();
    }
    if let Err(e) = file.flush().await {
        error!(path = %tmp.path().display(), err = %e, "could not flush temporary upload");
        drop(file);
        tmp.release().await;
        return Err(ApiError::internal());
    }
    drop(file);

    if written == 0 && original.is_empty() {
        tmp.release().await;
        return Ok(None);
    }
    Ok(Some(tmp))
}

async fn read_food_form(
    multipart: &mut Multipart,
    dir: &Path,
    image: &mut Option<TempUpload>,
) -> Result<FoodCandidate, ApiError> {
    let mut input = FoodCandidate::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let spooled = spool_image(field, dir).await?;
                // last image part wins
                if let Some(previous) = std::mem::replace(image, spooled) {
                    previous.release().await;
                }
            }
            "name" => input.name = field.text().await.map_err(multipart_error)?,
            "description" => input.description = field.text().await.map_err(multipart_error)?,
            "price" => input.price = field.text().await.map_err(multipart_error)?,
            "category" => input.category = field.text().await.map_err(multipart_error)?,
            other => debug!(field = %other, "ignoring unknown form field"),
        }
    }
    Ok(input)
}

#[utoipa::path(post, path = "/api/food/add", tag = "food",
    request_body(content = crate::openapi::AddFoodForm, content_type = "multipart/form-data"),
    params(("token" = String, Header, description = "Caller JWT")),
    responses(
        (status = 200, description = "Food Added", body = crate::openapi::FoodResponseDoc),
        (status = 400, description = "Missing image or invalid fields", body = crate::openapi::MessageResponseDoc),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::MessageResponseDoc),
        (status = 403, description = "Caller is not an admin", body = crate::openapi::MessageResponseDoc),
        (status = 500, description = "Upload or persistence failed", body = crate::openapi::MessageResponseDoc)
    ))]
pub async fn add_food(
    State(state): State<ServerState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<FoodItem>>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        debug!(err = %e, "multipart rejected");
        ApiError::bad_request("Invalid multipart body")
    })?;

    let mut image = None;
    let input = match read_food_form(&mut multipart, &state.uploads.dir, &mut image).await {
        Ok(input) => input,
        Err(e) => {
            if let Some(tmp) = image {
                tmp.release().await;
            }
            return Err(e);
        }
    };

    let item = state.catalog.create_food(caller_id, input, image).await?;
    Ok(Json(ApiResponse::ok("Food Added", item)))
}

#[utoipa::path(get, path = "/api/food/list", tag = "food",
    responses(
        (status = 200, description = "Every food item", body = crate::openapi::FoodListResponseDoc),
        (status = 500, description = "Store failure", body = crate::openapi::MessageResponseDoc)
    ))]
pub async fn list_food(State(state): State<ServerState>) -> Result<Json<ApiResponse<Vec<FoodItem>>>, ApiError> {
    let foods = state.catalog.list_foods().await?;
    Ok(Json(ApiResponse::data(foods)))
}

#[utoipa::path(post, path = "/api/food/remove", tag = "food",
    request_body = crate::openapi::RemoveFoodRequest,
    params(("token" = String, Header, description = "Caller JWT")),
    responses(
        (status = 200, description = "Food Removed", body = crate::openapi::MessageResponseDoc),
        (status = 400, description = "Malformed body", body = crate::openapi::MessageResponseDoc),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::MessageResponseDoc),
        (status = 403, description = "Caller is not an admin", body = crate::openapi::MessageResponseDoc),
        (status = 404, description = "Unknown id", body = crate::openapi::MessageResponseDoc)
    ))]
pub async fn remove_food(
    State(state): State<ServerState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    payload: Result<Json<RemoveFoodInput>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Json(input) = payload.map_err(|e| {
        debug!(err = %e, "remove body rejected");
        ApiError::bad_request("Invalid request body")
    })?;
    state.catalog.delete_food(caller_id, input.id).await?;
    Ok(Json(ApiResponse::message("Food Removed")))
}
