//! Ledger events

mod ledger_event;

pub use ledger_event::{
    ActorBannedEvent, ActorUnbannedEvent, LedgerEvent, ProjectAddedEvent, ProjectRemovedEvent,
    ScoreChangedEvent,
};
