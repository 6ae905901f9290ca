use axum::{
    async_trait,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use shared::schema::{self, Mode, Payload, Submitted};
use shared::{InventoryRecord, Movement, Product};
use tower::ServiceBuilder;
use tower_http::{cors, trace::TraceLayer};

use crate::error::ApiError;
use crate::service::ResourceService;
use crate::store::{Stored, Stores};

#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
}

/// Body of a create request. Every bound is checked and omitted fields take
/// their defaults.
pub struct Creation<T>(pub Submitted<T>);

/// Body of a replace request. As [`Creation`], but the identity comes from
/// the path.
pub struct Replacement<T>(pub Submitted<T>);

/// Body of a merge request. Only supplied fields are checked.
pub struct Partial<T>(pub Submitted<T>);

async fn submitted<S, T>(req: Request, state: &S, mode: Mode) -> Result<Submitted<T>, ApiError>
where
    S: Send + Sync,
    T: Payload + Send,
{
    let Json(body) = Json::<serde_json::Value>::from_request(req, state).await?;
    Ok(schema::parse(body, mode)?)
}

#[async_trait]
impl<S, T> FromRequest<S> for Creation<T>
where
    S: Send + Sync,
    T: Payload + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        submitted(req, state, Mode::Create).await.map(Creation)
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for Replacement<T>
where
    S: Send + Sync,
    T: Payload + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        submitted(req, state, Mode::Replace).await.map(Replacement)
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for Partial<T>
where
    S: Send + Sync,
    T: Payload + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        submitted(req, state, Mode::Partial).await.map(Partial)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .nest(Product::PATH, resource_routes::<Product>())
        .nest(InventoryRecord::PATH, resource_routes::<InventoryRecord>())
        .nest(Movement::PATH, resource_routes::<Movement>())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    cors::CorsLayer::new()
                        .allow_origin(cors::Any)
                        .allow_methods(cors::Any)
                        .allow_headers(cors::Any),
                ),
        )
}

fn resource_routes<E: Stored>() -> Router<AppState> {
    Router::new()
        .route("/check", get(list::<E>))
        .route("/check/:id", get(fetch::<E>))
        .route("/create", post(create::<E>))
        .route("/update/:id", put(update::<E>))
        .route("/edit/:id", patch(edit::<E>))
        .route("/remove/:id", delete(remove::<E>))
}

pub async fn list<E: Stored>(State(state): State<AppState>) -> Result<Json<Vec<E>>, ApiError> {
    let items = ResourceService::<E>::new(state.stores).list().await?;
    Ok(Json(items))
}

pub async fn fetch<E: Stored>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<E>, ApiError> {
    let item = ResourceService::<E>::new(state.stores).get(id).await?;
    Ok(Json(item))
}

pub async fn create<E: Stored>(
    State(state): State<AppState>,
    Creation(submitted): Creation<E::Request>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    let item = ResourceService::<E>::new(state.stores)
        .create(submitted)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update<E: Stored>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Replacement(submitted): Replacement<E::Request>,
) -> Result<Json<E>, ApiError> {
    let item = ResourceService::<E>::new(state.stores)
        .replace(id, submitted)
        .await?;
    Ok(Json(item))
}

pub async fn edit<E: Stored>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Partial(submitted): Partial<E::Request>,
) -> Result<Json<E>, ApiError> {
    let item = ResourceService::<E>::new(state.stores)
        .patch(id, submitted)
        .await?;
    Ok(Json(item))
}

pub async fn remove<E: Stored>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    ResourceService::<E>::new(state.stores).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn home() -> &'static str {
    "Inventory service"
}

pub async fn health_check() -> &'static str {
    "OK"
}
