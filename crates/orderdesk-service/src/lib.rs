//! Record-keeping core for agents, customers, orders and payments.
//!
//! Every public operation on [`OrderDesk`] opens one transaction on the
//! configured [`RecordStore`], validates and mutates inside it, and commits
//! only when every check passed. Returning early with an error drops the
//! transaction, which discards its writes.

use std::sync::Arc;

use orderdesk_core::RecordStore;

mod agents;
mod customers;
mod merge;
mod orders;
mod payments;
mod resolve;

pub use merge::{merge_customer, replacement_customer};

#[derive(Clone)]
pub struct OrderDesk {
    store: Arc<dyn RecordStore>,
}

impl OrderDesk {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}
