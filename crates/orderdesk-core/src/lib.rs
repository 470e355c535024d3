pub mod error;
pub mod inputs;
pub mod models;
pub mod storage;
pub mod views;

pub use error::{DeskError, DeskResult, EntityKind};
pub use inputs::{AgentInput, CustomerInput, OrderInput, OrderLineInput, PaymentInput, RecordRef};
pub use models::{Agent, Customer, Order, Payment, RecordId};
pub use storage::{RecordStore, RecordTx};
pub use views::{CustomerRef, CustomerView, OrderView};
