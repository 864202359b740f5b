//! HTTP API Layer
//!
//! REST API for installment plans, fiscal documents and the subscription
//! gate, built on Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one module per area (installments, reports, documents,
//!   subscription, admin)
//! - **Middleware**: JWT authentication, the admin gate and audit logging
//! - **DTOs**: validated request bodies, with `extract::OptionalJson` for
//!   bodies the caller may leave out
//! - **Monitor**: background count of payments awaiting verification
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, config::ApiConfig, AppState, Stores};
//!
//! let state = AppState::new(ApiConfig::default(), Stores::in_memory())?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod monitor;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::{CalendarError, Clock, HealthCheckable, Repository, Timezone};
use domain_billing::{DocumentService, FiscalDocument, Installment, InstallmentService};
use domain_subscription::{SubscriptionPayment, SubscriptionService, User};
use infra_db::{DatabasePool, InMemoryRepository, PgEntityRepository};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::handlers::{admin, documents, health, installments, reports, subscription};
use crate::middleware::{admin_middleware, audit_middleware, auth_middleware};
use crate::monitor::PendingVerifications;

/// One repository per entity type, plus the adapter reported by `/health`
#[derive(Clone)]
pub struct Stores {
    pub installments: Arc<dyn Repository<Installment>>,
    pub documents: Arc<dyn Repository<FiscalDocument>>,
    pub users: Arc<dyn Repository<User>>,
    pub payments: Arc<dyn Repository<SubscriptionPayment>>,
    pub health: Arc<dyn HealthCheckable>,
}

impl Stores {
    /// Empty in-memory stores; contents are lost on restart
    pub fn in_memory() -> Self {
        let installments = Arc::new(InMemoryRepository::<Installment>::new());
        Self {
            installments: installments.clone(),
            documents: Arc::new(InMemoryRepository::<FiscalDocument>::new()),
            users: Arc::new(InMemoryRepository::<User>::new()),
            payments: Arc::new(InMemoryRepository::<SubscriptionPayment>::new()),
            health: installments,
        }
    }

    /// Stores backed by the `entity_records` table
    pub fn postgres(pool: DatabasePool) -> Self {
        let installments = Arc::new(PgEntityRepository::<Installment>::new(pool.clone()));
        Self {
            installments: installments.clone(),
            documents: Arc::new(PgEntityRepository::<FiscalDocument>::new(pool.clone())),
            users: Arc::new(PgEntityRepository::<User>::new(pool.clone())),
            payments: Arc::new(PgEntityRepository::<SubscriptionPayment>::new(pool)),
            health: installments,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub installments: InstallmentService,
    pub documents: DocumentService,
    pub subscription: SubscriptionService,
    pub timezone: Timezone,
    pub clock: Clock,
    pub notifications: watch::Receiver<PendingVerifications>,
    pub health: Arc<dyn HealthCheckable>,
}

impl AppState {
    /// Builds the services over `stores`.
    ///
    /// Fails only when the configured timezone is unknown.
    pub fn new(config: ApiConfig, stores: Stores) -> Result<Self, CalendarError> {
        let timezone = config.timezone()?;
        let subscription =
            SubscriptionService::new(stores.users, stores.payments, config.gate_policy());

        Ok(Self {
            installments: InstallmentService::new(stores.installments),
            documents: DocumentService::new(stores.documents),
            subscription,
            timezone,
            clock: Clock::System(timezone),
            notifications: monitor::idle_channel(),
            health: stores.health,
            config: Arc::new(config),
        })
    }

    /// Pins "today"
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifications(mut self, rx: watch::Receiver<PendingVerifications>) -> Self {
        self.notifications = rx;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Parses a request date in the business timezone, or returns today
    pub fn date_or_today(&self, raw: Option<&str>) -> Result<NaiveDate, ApiError> {
        match raw {
            Some(raw) => Ok(self.timezone.parse_date(raw)?),
            None => Ok(self.today()),
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new().route("/health", get(health::health_check));

    let installment_routes = Router::new()
        .route("/", get(installments::list_installments))
        .route("/plans", post(installments::create_plan))
        .route("/:id/pay", post(installments::pay_installment));

    let report_routes = Router::new().route("/receivables", get(reports::receivables));

    let document_routes = Router::new()
        .route("/", post(documents::issue_document))
        .route("/:id", get(documents::get_document))
        .route("/:id/pay", post(documents::pay_document))
        .route("/:id/cancel", post(documents::cancel_document));

    let subscription_routes = Router::new()
        .route("/payments", post(subscription::submit_payment))
        .route("/gate", get(subscription::gate));

    let admin_routes = Router::new()
        .route("/payments/pending", get(admin::pending_payments))
        .route("/payments/:id/approve", post(admin::approve_payment))
        .route("/payments/:id/reject", post(admin::reject_payment))
        .route("/users", post(admin::register_user))
        .route("/users/:id/block", post(admin::block_user))
        .route("/users/:id/unblock", post(admin::unblock_user))
        .route("/notifications", get(admin::notifications))
        .layer(axum_middleware::from_fn(admin_middleware));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/installments", installment_routes)
        .nest("/reports", report_routes)
        .nest("/documents", document_routes)
        .nest("/subscription", subscription_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
