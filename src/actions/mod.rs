pub mod invoice;

pub use invoice::{ActionOutcome, InvoiceActions, CREATE_INVALID, UPDATE_INVALID};
