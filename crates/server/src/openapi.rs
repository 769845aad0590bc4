use axum::Json;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ImageRefDoc { pub url: String, pub public_id: String }

#[derive(ToSchema)]
pub struct FoodItemDoc {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image: ImageRefDoc,
}

/// Multipart body of `POST /api/food/add`.
#[derive(ToSchema)]
pub struct AddFoodForm {
    pub name: String,
    pub description: String,
    /// Decimal text, e.g. `12.50`.
    pub price: String,
    pub category: String,
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(ToSchema)]
pub struct RemoveFoodRequest { pub id: Uuid }

#[derive(ToSchema)]
pub struct MessageResponseDoc { pub success: bool, pub message: String }

#[derive(ToSchema)]
pub struct FoodResponseDoc { pub success: bool, pub message: String, pub data: FoodItemDoc }

#[derive(ToSchema)]
pub struct FoodListResponseDoc { pub success: bool, pub data: Vec<FoodItemDoc> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::food::add_food,
        crate::routes::food::list_food,
        crate::routes::food::remove_food,
    ),
    components(
        schemas(
            HealthResponse,
            ImageRefDoc,
            FoodItemDoc,
            AddFoodForm,
            RemoveFoodRequest,
            MessageResponseDoc,
            FoodResponseDoc,
            FoodListResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "food")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_food_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/api/food/add", "/api/food/list", "/api/food/remove"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
