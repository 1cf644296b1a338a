//! Feed consumption: ports, handler traits and the drain loop

pub mod consumer;
pub mod handlers;
pub mod ports;

pub use consumer::{FeedConsumer, FeedOptions, FeedOutcome, FeedReport};
pub use handlers::{
    DocumentFeed, FeedHandler, InvoiceFeed, PaylinkFeed, RefundFeed, TransactionFeed,
};
pub use ports::FeedSource;
