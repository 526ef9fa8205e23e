use crate::{
    auth::{Authorized, DeleteDrinks, GetDrinksDetail, PatchDrinks, PostDrinks},
    error::{ApiError, ErrorEnvelope},
    models::{
        DeletedDrinkResponse, DrinkDetailList, DrinkPayload, DrinkResponse, DrinkSummaryList,
    },
    repository::RepositoryState,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

// --- Handlers ---

/// get_drinks
///
/// [Public Route] Lists every drink in its summary form. No recipe data leaves through here.
#[utoipa::path(
    get,
    path = "/drinks",
    responses(
        (status = 200, description = "Drink summaries", body = DrinkSummaryList),
        (status = 400, description = "Listing failed", body = ErrorEnvelope)
    )
)]
pub async fn get_drinks(State(repo): State<RepositoryState>) -> Result<Json<DrinkSummaryList>, ApiError> {
    let drinks = repo.list_drinks().await?;
    Ok(Json(DrinkSummaryList {
        success: true,
        drinks: drinks.iter().map(|drink| drink.summary()).collect(),
    }))
}

/// get_drinks_detail
///
/// [Protected Route: `get:drinks-detail`] Lists every drink including its recipe.
#[utoipa::path(
    get,
    path = "/drinks-detail",
    responses(
        (status = 200, description = "Drink details", body = DrinkDetailList),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope)
    ),
    security(("bearer" = ["get:drinks-detail"]))
)]
pub async fn get_drinks_detail(
    _auth: Authorized<GetDrinksDetail>,
    State(repo): State<RepositoryState>,
) -> Result<Json<DrinkDetailList>, ApiError> {
    let drinks = repo.list_drinks().await?;
    Ok(Json(DrinkDetailList {
        success: true,
        drinks: drinks.iter().map(|drink| drink.detail()).collect(),
    }))
}

/// create_drink
///
/// [Protected Route: `post:drinks`] Persists a new drink; the id is assigned by storage.
/// Any failure to persist (including a duplicate title) is reported as a bad request.
#[utoipa::path(
    post,
    path = "/drinks",
    request_body = DrinkPayload,
    responses(
        (status = 200, description = "Created", body = DrinkResponse),
        (status = 400, description = "Invalid body or persistence failure", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope)
    ),
    security(("bearer" = ["post:drinks"]))
)]
pub async fn create_drink(
    Authorized { claims, .. }: Authorized<PostDrinks>,
    State(repo): State<RepositoryState>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> Result<Json<DrinkResponse>, ApiError> {
    let payload = valid_payload(payload)?;
    let drink = repo.insert_drink(payload).await?;

    tracing::info!(id = drink.id, sub = %claims.sub, "drink created");
    Ok(Json(DrinkResponse {
        success: true,
        drinks: drink.detail(),
    }))
}

/// update_drink
///
/// [Protected Route: `patch:drinks`] Replaces a drink's title and recipe.
///
/// *Ordering*: existence is checked before the body, so an unknown id is a 404 even when the
/// payload is also broken.
#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(("id" = i64, Path, description = "Drink ID")),
    request_body = DrinkPayload,
    responses(
        (status = 200, description = "Updated", body = DrinkResponse),
        (status = 400, description = "Invalid body or persistence failure", body = ErrorEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 404, description = "Not Found", body = ErrorEnvelope)
    ),
    security(("bearer" = ["patch:drinks"]))
)]
pub async fn update_drink(
    Authorized { claims, .. }: Authorized<PatchDrinks>,
    State(repo): State<RepositoryState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> Result<Json<DrinkResponse>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    if repo.get_drink(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let payload = valid_payload(payload)?;
    // The row can vanish between the lookup and the write.
    let drink = repo
        .update_drink(id, payload)
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(id, sub = %claims.sub, "drink updated");
    Ok(Json(DrinkResponse {
        success: true,
        drinks: drink.detail(),
    }))
}

/// delete_drink
///
/// [Protected Route: `delete:drinks`] Removes a drink and echoes what was removed.
/// Persistence faults here are reported as 422 rather than 400.
#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(("id" = i64, Path, description = "Drink ID")),
    responses(
        (status = 200, description = "Deleted", body = DeletedDrinkResponse),
        (status = 401, description = "Unauthorized", body = ErrorEnvelope),
        (status = 404, description = "Not Found", body = ErrorEnvelope),
        (status = 422, description = "Unprocessable", body = ErrorEnvelope)
    ),
    security(("bearer" = ["delete:drinks"]))
)]
pub async fn delete_drink(
    Authorized { claims, .. }: Authorized<DeleteDrinks>,
    State(repo): State<RepositoryState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedDrinkResponse>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;

    let deleted = repo.delete_drink(id).await.map_err(|e| {
        tracing::error!("delete error: {:?}", e);
        ApiError::Unprocessable
    })?;

    match deleted {
        Some(drink) => {
            tracing::info!(id, sub = %claims.sub, "drink deleted");
            Ok(Json(DeletedDrinkResponse {
                success: true,
                deleted: drink.detail(),
            }))
        }
        None => Err(ApiError::NotFound),
    }
}

fn valid_payload(payload: Result<Json<DrinkPayload>, JsonRejection>) -> Result<DrinkPayload, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!("rejected body: {}", e);
        ApiError::BadRequest
    })?;

    if payload.is_valid() {
        Ok(payload)
    } else {
        Err(ApiError::BadRequest)
    }
}
