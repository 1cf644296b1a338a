//! Resource services, one per API area
//!
//! Each service is a cheap clone over the shared transport. Feeds are
//! exposed both as a pull source (`feed_source`) and as a drain into a
//! handler (`feed`).

pub mod document;
pub mod feed;
pub mod invoice;
pub mod paylink;
pub mod refund;
pub mod transaction;

pub use document::{save_pdf, DocumentService};
pub use feed::ListFeed;
pub use invoice::InvoiceService;
pub use paylink::PaylinkService;
pub use refund::RefundService;
pub use transaction::TransactionService;
