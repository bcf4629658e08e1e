use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::actions::InvoiceActions;
use crate::handlers;
use crate::middleware::{route_gate, RouteGate};

/// Per-process state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub actions: Arc<InvoiceActions>,
}

impl AppState {
    pub fn new(actions: InvoiceActions) -> Self {
        Self {
            actions: Arc::new(actions),
        }
    }
}

pub fn router(state: AppState, gate: RouteGate) -> Router {
    Router::new()
        // Ungated by the default matcher
        .route("/api/health", get(handlers::health))
        // Invoice form actions
        .merge(invoice_routes())
        .with_state(state)
        // Global middleware; the gate also covers unmatched paths
        .layer(middleware::from_fn_with_state(gate, route_gate))
        .layer(TraceLayer::new_for_http())
}

fn invoice_routes() -> Router<AppState> {
    use handlers::invoices;

    Router::new()
        .route("/dashboard/invoices/create", post(invoices::create))
        .route("/dashboard/invoices/:id/edit", post(invoices::update))
        .route("/dashboard/invoices/:id/delete", post(invoices::delete))
}
