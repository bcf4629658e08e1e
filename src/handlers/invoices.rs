// handlers/invoices.rs - Invoice form action endpoints
//
// POST /dashboard/invoices/create      -> create
// POST /dashboard/invoices/:id/edit    -> update
// POST /dashboard/invoices/:id/delete  -> delete

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};

use crate::actions::{ActionOutcome, CREATE_INVALID, UPDATE_INVALID};
use crate::app::AppState;
use crate::error::ActionError;
use crate::validation::InvoiceForm;

/// Successful actions either navigate (303) or leave the caller in place (204)
impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        match self {
            ActionOutcome::Redirect(location) => Redirect::to(&location).into_response(),
            ActionOutcome::Revalidated => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// POST /dashboard/invoices/create
pub async fn create(
    State(state): State<AppState>,
    form: Result<Form<InvoiceForm>, FormRejection>,
) -> Result<ActionOutcome, ActionError> {
    let form = read_form(form, CREATE_INVALID)?;
    state.actions.create_invoice(&form).await
}

/// POST /dashboard/invoices/:id/edit
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: Result<Form<InvoiceForm>, FormRejection>,
) -> Result<ActionOutcome, ActionError> {
    let form = read_form(form, UPDATE_INVALID)?;
    state.actions.update_invoice(&id, &form).await
}

/// POST /dashboard/invoices/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ActionOutcome, ActionError> {
    state.actions.delete_invoice(&id).await
}

/// Unreadable bodies (wrong content type, duplicate keys, bad encoding) still answer with a `FormState`
fn read_form(
    form: Result<Form<InvoiceForm>, FormRejection>,
    summary: &str,
) -> Result<InvoiceForm, ActionError> {
    match form {
        Ok(Form(form)) => Ok(form),
        Err(rejection) => {
            tracing::debug!("Rejected invoice form body: {}", rejection.body_text());
            Err(ActionError::malformed_form(rejection.status(), summary))
        }
    }
}
