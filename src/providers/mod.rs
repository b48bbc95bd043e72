pub mod trello;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::board::{Board, Card, ChecklistItem, Comment, ListSummary, MemberProfile};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl FetchError {
    /// The upstream answered, but with a payload we could not make sense of.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::Decode(_))
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Read-only access to a task board service.
///
/// Implementations report every failure; deciding whether to fall back to a
/// default is left to the caller.
#[async_trait]
pub trait BoardSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_boards(&self) -> FetchResult<Vec<Board>>;
    async fn fetch_board_members(&self, board_id: &str) -> FetchResult<Vec<MemberProfile>>;
    /// Cards with their members and list summary embedded.
    async fn fetch_cards(&self, board_id: &str) -> FetchResult<Vec<Card>>;
    async fn fetch_member(&self, member_id: &str) -> FetchResult<MemberProfile>;
    async fn fetch_list(&self, list_id: &str) -> FetchResult<ListSummary>;
    async fn fetch_card_comments(&self, card_id: &str) -> FetchResult<Vec<Comment>>;
    async fn fetch_checklist_items(&self, card_id: &str) -> FetchResult<Vec<ChecklistItem>>;
}

#[cfg(test)]
pub mod tests;
