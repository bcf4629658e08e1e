mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{NaiveDate, Utc};
use serde_json::json;

use invoice_dashboard::database::models::{Invoice, InvoiceStatus};

async fn seed(app: &common::TestApp, id: &str) {
    app.store
        .seed(Invoice {
            id: id.to_string(),
            customer_id: common::CUSTOMER.to_string(),
            amount: 1500,
            status: InvoiceStatus::Pending,
            date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
        })
        .await;
}

#[tokio::test]
async fn create_inserts_cents_and_redirects_to_listing() -> Result<()> {
    let app = common::spawn_app(false);
    let body = format!("customerId={}&amount=50&status=pending", common::CUSTOMER);

    let res = common::send(&app, common::form_post("/dashboard/invoices/create", &body)).await?;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some(common::LISTING));

    let rows = app.store.all().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 5000);
    assert_eq!(rows[0].status, InvoiceStatus::Pending);
    assert_eq!(rows[0].date, Utc::now().date_naive());
    assert_eq!(app.cache.generation(common::LISTING).await, 1);
    Ok(())
}

#[tokio::test]
async fn create_with_zero_amount_returns_form_state() -> Result<()> {
    let app = common::spawn_app(false);
    let body = format!("customerId={}&amount=0&status=pending", common::CUSTOMER);

    let res = common::send(&app, common::form_post("/dashboard/invoices/create", &body)).await?;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.body,
        json!({
            "errors": { "amount": ["Amount must be greater than 0."] },
            "message": "Missing fields, Failed to create invoice"
        })
    );
    assert!(app.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn create_with_empty_form_reports_every_field() -> Result<()> {
    let app = common::spawn_app(false);

    let res = common::send(&app, common::form_post("/dashboard/invoices/create", "")).await?;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["errors"]["customer_id"], json!(["Please select a customer."]));
    assert_eq!(res.body["errors"]["amount"], json!(["Amount must be greater than 0."]));
    assert_eq!(res.body["errors"]["status"], json!(["Please select a status."]));
    Ok(())
}

#[tokio::test]
async fn create_reports_database_failure() -> Result<()> {
    let app = common::spawn_app(false);
    app.store.set_unavailable(true);
    let body = format!("customerId={}&amount=50&status=paid", common::CUSTOMER);

    let res = common::send(&app, common::form_post("/dashboard/invoices/create", &body)).await?;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body, json!({ "message": "Database error, Failed to create invoice." }));
    Ok(())
}

#[tokio::test]
async fn create_with_unreadable_body_still_returns_form_state() -> Result<()> {
    let app = common::spawn_app(false);
    let body = format!("customerId={}&amount=50&amount=60&status=pending", common::CUSTOMER);

    let res = common::send(&app, common::form_post("/dashboard/invoices/create", &body)).await?;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body, json!({ "message": "Missing fields, Failed to create invoice" }));
    assert!(app.store.is_empty().await);
    assert_eq!(app.cache.generation(common::LISTING).await, 0);
    Ok(())
}

#[tokio::test]
async fn update_replaces_fields_and_redirects() -> Result<()> {
    let app = common::spawn_app(false);
    seed(&app, "inv-1").await;
    let body = format!("customerId={}&amount=99.95&status=paid", common::CUSTOMER);

    let res = common::send(&app, common::form_post("/dashboard/invoices/inv-1/edit", &body)).await?;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some(common::LISTING));

    let row = app.store.get("inv-1").await.unwrap();
    assert_eq!(row.amount, 9995);
    assert_eq!(row.status, InvoiceStatus::Paid);
    assert_eq!(row.date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
    Ok(())
}

#[tokio::test]
async fn update_with_bad_status_uses_update_summary() -> Result<()> {
    let app = common::spawn_app(false);
    seed(&app, "inv-1").await;
    let body = format!("customerId={}&amount=10&status=void", common::CUSTOMER);

    let res = common::send(&app, common::form_post("/dashboard/invoices/inv-1/edit", &body)).await?;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["message"], "Invalid form data.");
    assert_eq!(
        res.body["errors"]["status"],
        json!(["Invalid enum value. Expected 'pending' | 'paid', received 'void'"])
    );
    Ok(())
}

#[tokio::test]
async fn update_with_database_down_does_not_navigate() -> Result<()> {
    let app = common::spawn_app(false);
    seed(&app, "inv-1").await;
    app.store.set_unavailable(true);
    let body = format!("customerId={}&amount=10&status=paid", common::CUSTOMER);

    let res = common::send(&app, common::form_post("/dashboard/invoices/inv-1/edit", &body)).await?;

    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(res.location().is_none());
    assert_eq!(res.body, json!({ "message": "Database error, Failed to update invoice." }));
    assert_eq!(app.cache.generation(common::LISTING).await, 0);
    Ok(())
}

#[tokio::test]
async fn update_of_unknown_invoice_is_not_found() -> Result<()> {
    let app = common::spawn_app(false);
    let body = format!("customerId={}&amount=10&status=paid", common::CUSTOMER);

    let res = common::send(&app, common::form_post("/dashboard/invoices/missing/edit", &body)).await?;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, json!({ "message": "Invoice not found." }));
    Ok(())
}

#[tokio::test]
async fn update_with_wrong_content_type_returns_form_state() -> Result<()> {
    let app = common::spawn_app(false);
    seed(&app, "inv-1").await;
    let request = Request::post("/dashboard/invoices/inv-1/edit")
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::COOKIE, common::session_cookie())
        .body(Body::from(format!("customerId={}&amount=10&status=paid", common::CUSTOMER)))?;

    let res = common::send(&app, request).await?;

    assert_eq!(res.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(res.body, json!({ "message": "Invalid form data." }));
    assert_eq!(app.store.get("inv-1").await.unwrap().amount, 1500);
    Ok(())
}

#[tokio::test]
async fn update_of_unknown_invoice_and_customer_is_not_found() -> Result<()> {
    let app = common::spawn_app(false);

    let res = common::send(
        &app,
        common::form_post("/dashboard/invoices/missing/edit", "customerId=ghost&amount=10&status=paid"),
    )
    .await?;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, json!({ "message": "Invoice not found." }));
    Ok(())
}

#[tokio::test]
async fn delete_is_refused_by_default() -> Result<()> {
    let app = common::spawn_app(false);
    seed(&app, "inv-1").await;

    let res = common::send(&app, common::form_post("/dashboard/invoices/inv-1/delete", "")).await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body, json!({ "message": "Failed to delete invoice." }));
    assert!(app.store.get("inv-1").await.is_some());
    Ok(())
}

#[tokio::test]
async fn delete_removes_invoice_when_enabled() -> Result<()> {
    let app = common::spawn_app(true);
    seed(&app, "inv-1").await;

    let res = common::send(&app, common::form_post("/dashboard/invoices/inv-1/delete", "")).await?;

    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(app.store.get("inv-1").await.is_none());
    assert_eq!(app.cache.generation(common::LISTING).await, 1);
    Ok(())
}
