//! Repository traits

mod repositories;

pub use repositories::{
    ActionRepository, BanRepository, CategoryCount, CooldownLimiter, CooldownStatus, EventSink,
    HistoryRepository, LedgerStore, ProjectQuery, ProjectRepository, ProjectSort, RepoResult,
};
