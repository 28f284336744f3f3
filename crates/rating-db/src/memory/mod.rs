//! In-memory implementation of every storage trait
//!
//! All state is held in one set of tables behind a single mutex and is lost
//! on restart. A ledger commit runs its whole read-plan-write sequence under
//! that lock without awaiting, so it is atomic with respect to every other
//! call. Used by tests and by single-process deployments without PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use rating_core::entities::{Action, ActionKind, Ban, HistoryRecord, Project};
use rating_core::error::DomainError;
use rating_core::ledger::{self, ActionWrite, LedgerOp, LedgerReceipt, LedgerRequest, PriorLookup};
use rating_core::traits::{
    ActionRepository, BanRepository, CategoryCount, HistoryRepository, LedgerStore,
    ProjectQuery, ProjectRepository, ProjectSort, RepoResult,
};
use rating_core::value_objects::{ActorId, Snowflake};

type UniqueKey = (ActorId, Snowflake, ActionKind);

#[derive(Debug, Clone)]
struct ProjectRow {
    project: Project,
    deleted: bool,
}

#[derive(Debug, Default)]
struct Tables {
    projects: HashMap<Snowflake, ProjectRow>,
    actions: HashMap<Snowflake, Action>,
    /// One like and one review per actor and project
    unique: HashMap<UniqueKey, Snowflake>,
    history: Vec<HistoryRecord>,
    archive: Vec<HistoryRecord>,
    bans: HashMap<ActorId, Ban>,
}

impl Tables {
    fn live_project(&self, id: Snowflake) -> Option<&Project> {
        self.projects
            .get(&id)
            .filter(|row| !row.deleted)
            .map(|row| &row.project)
    }

    fn live_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects
            .values()
            .filter(|row| !row.deleted)
            .map(|row| &row.project)
    }

    fn is_live(&self, project_id: Snowflake) -> bool {
        self.live_project(project_id).is_some()
    }

    fn prior(&self, lookup: PriorLookup) -> Option<Action> {
        match lookup {
            PriorLookup::None => None,
            PriorLookup::ByKey {
                actor_id,
                project_id,
                kind,
            } => self
                .unique
                .get(&(actor_id, project_id, kind))
                .and_then(|id| self.actions.get(id))
                .cloned(),
            PriorLookup::ByAction(id) => self.actions.get(&id).cloned(),
        }
    }
}

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_projects(projects: &mut [Project], sort: ProjectSort) {
    match sort {
        ProjectSort::Score => projects.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id))),
        ProjectSort::Name => projects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
        ProjectSort::CreatedAt => {
            projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        }
    }
}

fn page<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.into_iter().skip(offset).take(limit).collect()
}

fn newest_first(actions: &mut [Action]) {
    actions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Project>> {
        Ok(self.tables.lock().live_project(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Project>> {
        let wanted = name.trim().to_lowercase();
        let tables = self.tables.lock();
        let found = tables
            .live_projects()
            .find(|p| p.name.to_lowercase() == wanted)
            .cloned();
        Ok(found)
    }

    async fn create(&self, project: &Project) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        let wanted = project.name.to_lowercase();
        if tables.live_projects().any(|p| p.name.to_lowercase() == wanted) {
            return Err(DomainError::ProjectNameTaken(project.name.clone()));
        }
        if tables.projects.contains_key(&project.id) {
            return Err(DomainError::InternalError(format!(
                "duplicate project id {}",
                project.id
            )));
        }

        let mut stored = project.clone();
        stored.score = 0;
        tables.projects.insert(
            project.id,
            ProjectRow {
                project: stored,
                deleted: false,
            },
        );
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut tables = self.tables.lock();
        match tables.projects.get_mut(&id) {
            Some(row) if !row.deleted => {
                row.deleted = true;
                row.project.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(DomainError::ProjectNotFound(id)),
        }
    }

    async fn list(&self, query: &ProjectQuery) -> RepoResult<Vec<Project>> {
        let tables = self.tables.lock();
        let mut projects: Vec<Project> = tables
            .live_projects()
            .filter(|p| query.category.as_ref().is_none_or(|c| &p.category == c))
            .cloned()
            .collect();
        drop(tables);

        sort_projects(&mut projects, query.sort);
        Ok(page(projects, query.offset, query.limit))
    }

    async fn count(&self, category: Option<&str>) -> RepoResult<i64> {
        let tables = self.tables.lock();
        let count = tables
            .live_projects()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .count();
        Ok(count as i64)
    }

    async fn search(&self, query: &str, limit: i64) -> RepoResult<Vec<Project>> {
        let needle = query.trim().to_lowercase();
        let tables = self.tables.lock();
        let mut projects: Vec<Project> = tables
            .live_projects()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        drop(tables);

        sort_projects(&mut projects, ProjectSort::Score);
        Ok(page(projects, 0, limit))
    }

    async fn categories(&self) -> RepoResult<Vec<CategoryCount>> {
        let tables = self.tables.lock();
        let mut counts: HashMap<&str, i64> = HashMap::new();
        for project in tables.live_projects() {
            *counts.entry(project.category.as_str()).or_default() += 1;
        }
        let mut result: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        result.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(result)
    }
}

#[async_trait]
impl ActionRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Action>> {
        Ok(self.tables.lock().actions.get(&id).cloned())
    }

    async fn find_contribution(
        &self,
        actor_id: ActorId,
        project_id: Snowflake,
        kind: ActionKind,
    ) -> RepoResult<Option<Action>> {
        Ok(self.tables.lock().prior(PriorLookup::ByKey {
            actor_id,
            project_id,
            kind,
        }))
    }

    async fn reviews_for_project(
        &self,
        project_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<Action>> {
        let tables = self.tables.lock();
        let mut reviews: Vec<Action> = tables
            .actions
            .values()
            .filter(|a| a.project_id == project_id && a.kind == ActionKind::Review)
            .cloned()
            .collect();
        drop(tables);

        newest_first(&mut reviews);
        Ok(page(reviews, 0, limit))
    }

    async fn count_by_kind(
        &self,
        project_id: Option<Snowflake>,
        kind: ActionKind,
    ) -> RepoResult<i64> {
        let tables = self.tables.lock();
        let count = tables
            .actions
            .values()
            .filter(|a| a.kind == kind && tables.is_live(a.project_id))
            .filter(|a| project_id.is_none_or(|p| a.project_id == p))
            .count();
        Ok(count as i64)
    }

    async fn find_by_actor(&self, actor_id: ActorId, kind: ActionKind) -> RepoResult<Vec<Action>> {
        let tables = self.tables.lock();
        let mut actions: Vec<Action> = tables
            .actions
            .values()
            .filter(|a| a.actor_id == actor_id && a.kind == kind && tables.is_live(a.project_id))
            .cloned()
            .collect();
        drop(tables);

        newest_first(&mut actions);
        Ok(actions)
    }
}

#[async_trait]
impl HistoryRepository for MemoryStore {
    async fn find_by_project(
        &self,
        project_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<HistoryRecord>> {
        let tables = self.tables.lock();
        let mut records: Vec<HistoryRecord> = tables
            .history
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        drop(tables);

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page(records, 0, limit))
    }

    async fn archive_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let mut tables = self.tables.lock();
        let (old, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut tables.history)
            .into_iter()
            .partition(|r| r.created_at < cutoff);
        tables.history = keep;
        let moved = old.len() as u64;
        tables.archive.extend(old);
        Ok(moved)
    }

    async fn count_archived(&self) -> RepoResult<i64> {
        Ok(self.tables.lock().archive.len() as i64)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn commit(&self, request: &LedgerRequest) -> RepoResult<LedgerReceipt> {
        let mut tables = self.tables.lock();

        let project_id = match &request.op {
            LedgerOp::Contribute { project_id, .. } => *project_id,
            LedgerOp::Reverse { action_id, .. } => tables
                .actions
                .get(action_id)
                .map(|a| a.project_id)
                .ok_or(DomainError::ActionNotFound(*action_id))?,
        };

        let score_before = tables
            .live_project(project_id)
            .map(|p| p.score)
            .ok_or(DomainError::ProjectNotFound(project_id))?;

        let prior = tables.prior(request.op.prior_lookup());
        let plan = ledger::plan(request, prior.as_ref())?;
        let record = plan.history_record(request.history_id, score_before, request.at)?;

        // Every check happens before the first write below
        if let ActionWrite::Insert(action) = &plan.write {
            if tables.actions.contains_key(&action.id) {
                return Err(DomainError::InternalError(format!(
                    "duplicate action id {}",
                    action.id
                )));
            }
        }

        match &plan.write {
            ActionWrite::Insert(action) => {
                if action.kind.is_unique_per_actor() {
                    tables
                        .unique
                        .insert((action.actor_id, action.project_id, action.kind), action.id);
                }
                tables.actions.insert(action.id, action.clone());
            }
            ActionWrite::Update {
                id,
                text,
                stars,
                delta,
                at,
            } => {
                if let Some(action) = tables.actions.get_mut(id) {
                    action.text = Some(text.clone());
                    action.stars = Some(*stars);
                    action.delta = *delta;
                    action.updated_at = *at;
                }
            }
            ActionWrite::Delete { id } => {
                if let Some(action) = tables.actions.remove(id) {
                    tables
                        .unique
                        .remove(&(action.actor_id, action.project_id, action.kind));
                }
            }
        }

        if let Some(row) = tables.projects.get_mut(&project_id) {
            row.project.score = record.score_after;
            row.project.updated_at = request.at;
        }
        let receipt = plan.receipt(&record);
        tables.history.push(record);

        Ok(receipt)
    }

    async fn derived_score(&self, project_id: Snowflake) -> RepoResult<i64> {
        let tables = self.tables.lock();
        if !tables.is_live(project_id) {
            return Err(DomainError::ProjectNotFound(project_id));
        }
        let derived: i64 = tables
            .actions
            .values()
            .filter(|a| a.project_id == project_id)
            .map(|a| a.delta)
            .sum();
        Ok(derived)
    }
}

#[async_trait]
impl BanRepository for MemoryStore {
    async fn is_banned(&self, actor_id: ActorId) -> RepoResult<bool> {
        Ok(self.tables.lock().bans.contains_key(&actor_id))
    }

    async fn find(&self, actor_id: ActorId) -> RepoResult<Option<Ban>> {
        Ok(self.tables.lock().bans.get(&actor_id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Ban>> {
        let mut bans: Vec<Ban> = self.tables.lock().bans.values().cloned().collect();
        bans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bans)
    }

    async fn create(&self, ban: &Ban) -> RepoResult<()> {
        self.tables.lock().bans.insert(ban.actor_id, ban.clone());
        Ok(())
    }

    async fn delete(&self, actor_id: ActorId) -> RepoResult<bool> {
        Ok(self.tables.lock().bans.remove(&actor_id).is_some())
    }
}
