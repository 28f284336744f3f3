//! Ledger planning - turns a request plus its prior action into a concrete write plan

mod plan;
mod request;

pub use plan::{plan, validate_review_text, ActionWrite, Plan, MAX_REVIEW_CHARS};
pub use request::{LedgerOp, LedgerReceipt, LedgerRequest, PriorLookup};
