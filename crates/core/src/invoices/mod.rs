//! Invoices module - records produced by the OCR capture pipeline.

mod invoices_model;

pub use invoices_model::{Invoice, ParsedInvoice, INVOICE_STATUS_PENDING};
