pub mod invoice;

pub use invoice::{Invoice, InvoiceChanges, InvoiceStatus, NewInvoice};
