//! Business logic services
//!
//! This module contains the service layer: the access gate, review
//! conversations, the ledger service, catalog reads, admin commands,
//! retention and the dispatcher that ties them to inbound events.

pub mod admin;
pub mod catalog;
pub mod context;
pub mod conversation;
pub mod dispatcher;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod retention;

#[cfg(test)]
mod test_support;

// Re-export all services for convenience
pub use admin::AdminService;
pub use catalog::CatalogService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use conversation::{
    ConversationInput, ConversationService, ConversationState, ConversationStore, ReviewDraft,
};
pub use dispatcher::Dispatcher;
pub use error::{ServiceError, ServiceResult};
pub use gate::{AccessGate, GateDecision, GateScope};
pub use ledger::{LedgerService, ReconcileReport};
pub use retention::{RetentionPolicy, RetentionService};
