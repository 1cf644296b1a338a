//! Typed request and response models, grouped per resource.

pub mod document;
pub mod feed;
pub mod invoice;
pub mod paylink;
pub mod refund;
pub mod transaction;

pub use document::*;
pub use feed::{DocumentEvent, FeedControl, FeedPage};
pub use invoice::*;
pub use paylink::*;
pub use refund::*;
pub use transaction::*;
