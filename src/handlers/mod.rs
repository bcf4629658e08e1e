// handlers/mod.rs - HTTP entry points
//
// Invoice actions live under the gated dashboard; the health check sits under
// /api, which the default route matcher leaves ungated.
pub mod health;
pub mod invoices;

pub use health::health;
