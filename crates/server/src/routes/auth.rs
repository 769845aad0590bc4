use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::{Request, State}, middleware::Next, response::{IntoResponse, Response}};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use service::food::service::DynFoodCatalogService;
use uuid::Uuid;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

/// Where multipart image parts are spooled before the catalog uploads them.
#[derive(Clone, Debug)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<DynFoodCatalogService>,
    pub auth: ServerAuthConfig,
    pub uploads: UploadSettings,
}

impl ServerState {
    pub fn new(catalog: Arc<DynFoodCatalogService>, cfg: &configs::AppConfig) -> Self {
        Self {
            catalog,
            auth: ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone() },
            uploads: UploadSettings { dir: PathBuf::from(&cfg.uploads.dir), max_bytes: cfg.uploads.max_bytes },
        }
    }
}

/// Authenticated caller id, inserted into request extensions by `require_caller`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller(pub Uuid);

/// JWT payload; `id` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub exp: usize,
}

fn token_from_headers(req: &Request) -> Option<String> {
    let headers = req.headers();
    if let Some(t) = headers.get("token").and_then(|v| v.to_str().ok()) {
        return Some(t.trim().to_string()).filter(|t| !t.is_empty());
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Decode an HS256 token and return the caller id it names.
pub fn decode_caller(token: &str, secret: &str) -> Result<Uuid, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256))?;
    Uuid::parse_str(&data.claims.id)
        .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidSubject.into())
}

/// 中间件：从 `token` 头（或 Authorization: Bearer）解析调用者；缺失或非法返回 401
pub async fn require_caller(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let Some(token) = token_from_headers(&req) else {
        tracing::warn!(%path, "missing token header");
        return ApiError::unauthorized("Not Authorized Login Again").into_response();
    };

    match decode_caller(&token, &state.auth.jwt_secret) {
        Ok(id) => {
            req.extensions_mut().insert(Caller(id));
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(%path, err = %e, "token validation failed");
            ApiError::unauthorized("Invalid token").into_response()
        }
    }
}
