pub mod context;
pub mod timezone;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::config::SyncConfig;
use crate::model::board::{
    join_comments, Board, Card, ChecklistItem, UNKNOWN_LIST, UNKNOWN_MEMBER,
};
use crate::model::task_record::TaskRecord;
use crate::providers::{BoardSource, FetchError};

pub use context::LookupContext;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("API credentials not set")]
    MissingCredentials,
    #[error("No boards found")]
    NoBoards,
    #[error("{operation} failed: {source}")]
    Upstream {
        operation: String,
        #[source]
        source: FetchError,
    },
}

impl SyncError {
    fn upstream(operation: impl Into<String>, source: FetchError) -> Self {
        SyncError::Upstream {
            operation: operation.into(),
            source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub status: &'static str,
    pub timestamp: String,
    pub total_tasks: usize,
    pub tasks: Vec<TaskRecord>,
}

impl SyncReport {
    fn new(tasks: Vec<TaskRecord>) -> Self {
        Self {
            status: "success",
            timestamp: now_iso(),
            total_tasks: tasks.len(),
            tasks,
        }
    }
}

/// Local time, ISO-8601 with microseconds.
pub fn now_iso() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Joins boards, cards, members, comments and checklists into flat task records.
///
/// Upstream calls are made one at a time. Transport and HTTP-status failures
/// fall back to empty or placeholder values and are logged; a malformed
/// board, card or checklist payload aborts the pass.
pub struct BoardFlattener<'a> {
    source: &'a dyn BoardSource,
    context: &'a mut LookupContext,
    options: SyncConfig,
}

impl<'a> BoardFlattener<'a> {
    pub fn new(
        source: &'a dyn BoardSource,
        context: &'a mut LookupContext,
        options: SyncConfig,
    ) -> Self {
        Self {
            source,
            context,
            options,
        }
    }

    /// Flatten every board visible to the source.
    pub async fn run(&mut self) -> Result<SyncReport, SyncError> {
        let boards = self.fetch_boards().await?;
        if boards.is_empty() {
            return Err(SyncError::NoBoards);
        }
        tracing::info!(source = self.source.name(), boards = boards.len(), "Starting sync");

        let tasks = self.flatten_boards(&boards).await?;
        tracing::info!(
            tasks = tasks.len(),
            processed_cards = self.context.processed_count(),
            "Sync finished"
        );
        Ok(SyncReport::new(tasks))
    }

    async fn fetch_boards(&self) -> Result<Vec<Board>, SyncError> {
        match self.source.fetch_boards().await {
            Ok(boards) => Ok(boards),
            Err(e) if e.is_malformed() => Err(SyncError::upstream("fetch boards", e)),
            Err(e) => {
                tracing::warn!(error = %e, "Fetching boards failed, treating as no boards");
                Ok(Vec::new())
            }
        }
    }

    pub async fn flatten_boards(&mut self, boards: &[Board]) -> Result<Vec<TaskRecord>, SyncError> {
        let mut tasks = Vec::new();
        for board in boards {
            tasks.extend(self.flatten_board(board).await?);
        }
        Ok(tasks)
    }

    async fn flatten_board(&mut self, board: &Board) -> Result<Vec<TaskRecord>, SyncError> {
        let member_lookup = self.board_member_lookup(&board.id).await;

        let cards = match self.source.fetch_cards(&board.id).await {
            Ok(cards) => cards,
            Err(e) if e.is_malformed() => {
                return Err(SyncError::upstream(format!("fetch cards for board {}", board.id), e))
            }
            Err(e) => {
                tracing::warn!(board = %board.id, error = %e, "Fetching cards failed");
                Vec::new()
            }
        };

        let mut tasks = Vec::new();
        for card in cards.iter().filter(|c| !c.closed) {
            if self.context.is_processed(&card.id) {
                tracing::debug!(card = %card.id, "Skipping already processed card");
                continue;
            }
            tasks.extend(self.flatten_card(board, card, &member_lookup).await?);
            self.context.mark_processed(card.id.clone());
        }

        tracing::debug!(board = %board.name, records = tasks.len(), "Flattened board");
        Ok(tasks)
    }

    async fn flatten_card(
        &mut self,
        board: &Board,
        card: &Card,
        member_lookup: &HashMap<String, String>,
    ) -> Result<Vec<TaskRecord>, SyncError> {
        let assigned_to = card.assigned_to();
        let status = self.card_status(card).await;
        let comment = self.card_comments(&card.id).await;
        let items = self.checklist_items(&card.id).await?;

        let record = |step: String, step_assigned_to: String, step_status: String, due_date: String| {
            TaskRecord {
                client_name: board.name.clone(),
                project_name: card.name.clone(),
                status: status.clone(),
                assigned_to: assigned_to.clone(),
                step,
                step_assigned_to,
                step_status,
                due_date,
                trello_card_link: card.short_url.clone(),
                comment: comment.clone(),
                notes: String::new(),
            }
        };

        if items.is_empty() {
            if self.options.emit_cards_without_checklists {
                return Ok(vec![record(
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                )]);
            }
            tracing::debug!(card = %card.id, "Card has no checklist items, no records emitted");
            return Ok(Vec::new());
        }

        Ok(items
            .into_iter()
            .map(|item| {
                let assignees = step_assignees(&item, member_lookup);
                let due = item
                    .due
                    .as_deref()
                    .map(timezone::to_central_display)
                    .unwrap_or_default();
                record(item.name, assignees, item.status.as_str().to_string(), due)
            })
            .collect())
    }

    /// Member id to display name for one board. Also seeds the member cache.
    pub async fn board_member_lookup(&mut self, board_id: &str) -> HashMap<String, String> {
        let members = self
            .source
            .fetch_board_members(board_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(board = %board_id, error = %e, "Fetching board members failed");
                Vec::new()
            });

        let mut lookup = HashMap::new();
        for member in members {
            let Some(id) = member.id.clone() else {
                continue;
            };
            let name = member.resolved_name();
            self.context.remember_member(id.clone(), name.clone());
            lookup.insert(id, name);
        }
        lookup
    }

    /// Cached member name, fetching `/members/{id}` on a miss.
    pub async fn resolve_member_name(&mut self, member_id: &str) -> String {
        if let Some(name) = self.context.member_name(member_id) {
            return name.to_string();
        }
        match self.source.fetch_member(member_id).await {
            Ok(profile) => {
                let name = profile.resolved_name();
                self.context.remember_member(member_id, name.clone());
                name
            }
            Err(e) => {
                tracing::warn!(member = %member_id, error = %e, "Resolving member failed");
                UNKNOWN_MEMBER.to_string()
            }
        }
    }

    /// Cached list name, fetching `/lists/{id}` on a miss.
    pub async fn resolve_list_name(&mut self, list_id: &str) -> String {
        if let Some(name) = self.context.list_name(list_id) {
            return name.to_string();
        }
        match self.source.fetch_list(list_id).await {
            Ok(list) => {
                let name = list.name.unwrap_or_else(|| UNKNOWN_LIST.to_string());
                self.context.remember_list(list_id, name.clone());
                name
            }
            Err(e) => {
                tracing::warn!(list = %list_id, error = %e, "Resolving list failed");
                UNKNOWN_LIST.to_string()
            }
        }
    }

    async fn card_status(&mut self, card: &Card) -> String {
        if let Some(list) = card.list.as_ref().filter(|l| l.name.is_some() || l.id.is_some()) {
            let Some(name) = list.name.clone() else {
                return UNKNOWN_LIST.to_string();
            };
            if let Some(id) = &list.id {
                self.context.remember_list(id.clone(), name.clone());
            }
            return name;
        }
        match card.id_list.as_deref().filter(|id| !id.is_empty()) {
            Some(list_id) => self.resolve_list_name(list_id).await,
            None => UNKNOWN_LIST.to_string(),
        }
    }

    async fn card_comments(&self, card_id: &str) -> String {
        match self.source.fetch_card_comments(card_id).await {
            Ok(comments) => join_comments(&comments),
            Err(e) => {
                tracing::warn!(card = %card_id, error = %e, "Fetching comments failed");
                String::new()
            }
        }
    }

    async fn checklist_items(&self, card_id: &str) -> Result<Vec<ChecklistItem>, SyncError> {
        match self.source.fetch_checklist_items(card_id).await {
            Ok(items) => Ok(items),
            Err(e) if e.is_malformed() => Err(SyncError::upstream(
                format!("fetch checklists for card {card_id}"),
                e,
            )),
            Err(e) => {
                tracing::warn!(card = %card_id, error = %e, "Fetching checklists failed");
                Ok(Vec::new())
            }
        }
    }
}

/// Names of a checklist item's assignees that are members of the board.
/// Ids missing from the board lookup are dropped.
pub fn step_assignees(item: &ChecklistItem, member_lookup: &HashMap<String, String>) -> String {
    item.assignee_ids
        .iter()
        .filter_map(|id| member_lookup.get(id))
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}
