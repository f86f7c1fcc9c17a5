use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{
    config::{Settings, StoreBackend},
    error::ApiError,
    repositories::{
        CaseRepository, EvidenceRepository, StoreCaseRepository, StoreEvidenceRepository,
        StoreUserRepository, UserRepository,
    },
    services::{CaseService, EvidenceService, UserService},
    store::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
};

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod response;
pub mod services;
pub mod store;
pub mod utils;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub store: Arc<dyn DocumentStore>,
    pub evidence_service: Arc<EvidenceService>,
    pub case_service: Arc<CaseService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Open the configured store backend and wire the services on top of it.
    pub async fn new(config: Settings) -> Result<Self, ApiError> {
        let store: Arc<dyn DocumentStore> = match config.backend()? {
            StoreBackend::Postgres => Arc::new(
                PgDocumentStore::connect(&config.database_url, config.database_max_connections)
                    .await?,
            ),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on shutdown");
                Arc::new(MemoryDocumentStore::new())
            }
        };
        Ok(Self::with_store(config, store))
    }

    /// Create application state over an existing store
    pub fn with_store(config: Settings, store: Arc<dyn DocumentStore>) -> Self {
        let evidence_repository: Arc<dyn EvidenceRepository + Send + Sync> =
            Arc::new(StoreEvidenceRepository::new(store.clone()));
        let case_repository: Arc<dyn CaseRepository + Send + Sync> =
            Arc::new(StoreCaseRepository::new(store.clone()));
        let user_repository: Arc<dyn UserRepository + Send + Sync> =
            Arc::new(StoreUserRepository::new(store.clone()));

        let evidence_service = Arc::new(EvidenceService::new(
            evidence_repository,
            case_repository.clone(),
        ));
        let case_service = Arc::new(CaseService::new(case_repository, user_repository.clone()));
        let user_service = Arc::new(UserService::new(user_repository));

        Self {
            config: Arc::new(config),
            store,
            evidence_service,
            case_service,
            user_service,
        }
    }
}

/// Build the complete HTTP application: routes, fallback and global layers.
pub fn build_router(app_state: AppState) -> Router {
    let body_limit = usize::try_from(app_state.config.max_body_bytes).unwrap_or(usize::MAX);
    let cors_layer = middleware::create_cors_layer(&app_state.config.cors_allow_origins);

    let health_routes = Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/health/live", get(handlers::liveness_check));

    let evidence_routes = Router::new()
        .route(
            "/api/evidence",
            post(handlers::evidence_handlers::create_evidence)
                .get(handlers::evidence_handlers::list_evidence),
        )
        .route("/api/evidence/bulk", post(handlers::evidence_handlers::create_many_evidence))
        .route("/api/evidence/clear-all", delete(handlers::evidence_handlers::delete_all_evidence))
        .route("/api/evidence/case/:caseId", get(handlers::evidence_handlers::list_evidence_by_case))
        .route(
            "/api/evidence/:id",
            get(handlers::evidence_handlers::get_evidence)
                .put(handlers::evidence_handlers::update_evidence)
                .delete(handlers::evidence_handlers::delete_evidence),
        )
        .route("/api/evidence/:id/radiograph", put(handlers::evidence_handlers::add_radiograph))
        .route("/api/evidence/:id/odontogram", put(handlers::evidence_handlers::add_odontogram))
        .route("/api/evidence/:id/document", put(handlers::evidence_handlers::add_document))
        .route(
            "/api/evidence/:id/radiograph/:subId",
            delete(handlers::evidence_handlers::remove_radiograph),
        )
        .route(
            "/api/evidence/:id/odontogram/:subId",
            delete(handlers::evidence_handlers::remove_odontogram),
        )
        .route(
            "/api/evidence/:id/document/:subId",
            delete(handlers::evidence_handlers::remove_document),
        );

    let case_routes = Router::new()
        .route(
            "/api/cases",
            post(handlers::case_handlers::create_case).get(handlers::case_handlers::list_cases),
        )
        .route("/api/cases/status/:status", get(handlers::case_handlers::list_cases_by_status))
        .route(
            "/api/cases/responsible/:responsibleId/status/:status",
            get(handlers::case_handlers::list_cases_by_responsible_and_status),
        )
        .route(
            "/api/cases/:id",
            get(handlers::case_handlers::get_case)
                .put(handlers::case_handlers::update_case)
                .delete(handlers::case_handlers::delete_case),
        );

    let user_routes = Router::new()
        .route(
            "/api/users",
            post(handlers::user_handlers::create_user).get(handlers::user_handlers::list_users),
        )
        .route(
            "/api/users/profile/:profileType",
            get(handlers::user_handlers::list_users_by_profile),
        )
        .route(
            "/api/users/:id",
            get(handlers::user_handlers::get_user)
                .put(handlers::user_handlers::update_user)
                .delete(handlers::user_handlers::delete_user),
        )
        .route("/api/users/:id/photo", put(handlers::user_handlers::update_user_photo));

    Router::new()
        .merge(health_routes)
        .merge(evidence_routes)
        .merge(case_routes)
        .merge(user_routes)
        .fallback(handlers::not_found)
        .with_state(app_state)
        // Apply middleware layers (global)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::security_headers_middleware))
        .layer(axum::middleware::from_fn(middleware::request_logging_middleware))
        .layer(middleware::create_logging_layer())
        .layer(cors_layer)
}
