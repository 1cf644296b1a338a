//! Callback traits for feed consumers
//!
//! Each resource has its own handler trait with one method per event kind.
//! Every method has a no-op default returning [`FeedControl::Continue`], so a
//! caller only implements what it cares about. The blanket impls at the
//! bottom adapt each trait to the generic [`FeedHandler`] the consumer drives.

use twikey_domain::{
    DocumentEvent, FeedControl, Invoice, Mandate, Paylink, Reason, Refund, Transaction,
};

/// Generic sink the consumer dispatches into.
pub trait FeedHandler<E> {
    /// Called once per non-empty page, before its items are dispatched.
    fn start(&mut self, cursor: Option<&str>, count: usize);

    fn dispatch(&mut self, event: E) -> FeedControl;
}

/// Mandate lifecycle events.
pub trait DocumentFeed {
    fn start(&mut self, _cursor: Option<&str>, _count: usize) {}

    fn new_document(&mut self, _mandate: Mandate, _at: String) -> FeedControl {
        FeedControl::Continue
    }

    /// `original_mandate_number` is the number before the amendment.
    fn updated_document(
        &mut self,
        _original_mandate_number: String,
        _mandate: Mandate,
        _reason: Reason,
        _at: String,
    ) -> FeedControl {
        FeedControl::Continue
    }

    fn cancelled_document(
        &mut self,
        _mandate_number: String,
        _reason: Reason,
        _at: String,
    ) -> FeedControl {
        FeedControl::Continue
    }
}

pub trait InvoiceFeed {
    fn start(&mut self, _cursor: Option<&str>, _count: usize) {}

    fn invoice(&mut self, _invoice: Invoice) -> FeedControl {
        FeedControl::Continue
    }
}

pub trait TransactionFeed {
    fn start(&mut self, _cursor: Option<&str>, _count: usize) {}

    fn transaction(&mut self, _transaction: Transaction) -> FeedControl {
        FeedControl::Continue
    }
}

pub trait PaylinkFeed {
    fn start(&mut self, _cursor: Option<&str>, _count: usize) {}

    fn paylink(&mut self, _link: Paylink) -> FeedControl {
        FeedControl::Continue
    }
}

pub trait RefundFeed {
    fn start(&mut self, _cursor: Option<&str>, _count: usize) {}

    fn refund(&mut self, _refund: Refund) -> FeedControl {
        FeedControl::Continue
    }
}

impl<T: DocumentFeed + ?Sized> FeedHandler<DocumentEvent> for T {
    fn start(&mut self, cursor: Option<&str>, count: usize) {
        DocumentFeed::start(self, cursor, count);
    }

    fn dispatch(&mut self, event: DocumentEvent) -> FeedControl {
        match event {
            DocumentEvent::Created { mandate, at } => self.new_document(mandate, at),
            DocumentEvent::Updated { original_mandate_number, mandate, reason, at } => {
                self.updated_document(original_mandate_number, mandate, reason, at)
            }
            DocumentEvent::Cancelled { mandate_number, reason, at } => {
                self.cancelled_document(mandate_number, reason, at)
            }
        }
    }
}

impl<T: InvoiceFeed + ?Sized> FeedHandler<Invoice> for T {
    fn start(&mut self, cursor: Option<&str>, count: usize) {
        InvoiceFeed::start(self, cursor, count);
    }

    fn dispatch(&mut self, event: Invoice) -> FeedControl {
        self.invoice(event)
    }
}

impl<T: TransactionFeed + ?Sized> FeedHandler<Transaction> for T {
    fn start(&mut self, cursor: Option<&str>, count: usize) {
        TransactionFeed::start(self, cursor, count);
    }

    fn dispatch(&mut self, event: Transaction) -> FeedControl {
        self.transaction(event)
    }
}

impl<T: PaylinkFeed + ?Sized> FeedHandler<Paylink> for T {
    fn start(&mut self, cursor: Option<&str>, count: usize) {
        PaylinkFeed::start(self, cursor, count);
    }

    fn dispatch(&mut self, event: Paylink) -> FeedControl {
        self.paylink(event)
    }
}

impl<T: RefundFeed + ?Sized> FeedHandler<Refund> for T {
    fn start(&mut self, cursor: Option<&str>, count: usize) {
        RefundFeed::start(self, cursor, count);
    }

    fn dispatch(&mut self, event: Refund) -> FeedControl {
        self.refund(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl DocumentFeed for Recorder {
        fn new_document(&mut self, mandate: Mandate, _at: String) -> FeedControl {
            self.seen.push(format!("new:{}", mandate.mandate_number.unwrap_or_default()));
            FeedControl::Continue
        }

        fn cancelled_document(&mut self, number: String, _: Reason, _: String) -> FeedControl {
            self.seen.push(format!("cancel:{number}"));
            FeedControl::Stop
        }
    }

    #[test]
    fn document_events_route_to_matching_method() {
        let mut recorder = Recorder::default();
        let created = DocumentEvent::Created {
            mandate: Mandate { mandate_number: Some("A1".into()), ..Mandate::default() },
            at: "t".into(),
        };
        let cancelled = DocumentEvent::Cancelled {
            mandate_number: "A1".into(),
            reason: Reason::default(),
            at: "t".into(),
        };

        assert_eq!(recorder.dispatch(created), FeedControl::Continue);
        assert_eq!(recorder.dispatch(cancelled), FeedControl::Stop);
        assert_eq!(recorder.seen, vec!["new:A1", "cancel:A1"]);
    }

    #[test]
    fn missing_methods_default_to_continue() {
        struct Silent;
        impl DocumentFeed for Silent {}
        impl RefundFeed for Silent {}

        let mut silent = Silent;
        let updated = DocumentEvent::Updated {
            original_mandate_number: "A1".into(),
            mandate: Mandate::default(),
            reason: Reason::default(),
            at: "t".into(),
        };
        assert_eq!(silent.dispatch(updated), FeedControl::Continue);
        assert_eq!(silent.dispatch(Refund::default()), FeedControl::Continue);
    }
}
