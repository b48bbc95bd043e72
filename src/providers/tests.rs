use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BoardSource, FetchError, FetchResult};
use crate::model::board::{
    Board, Card, ChecklistItem, Comment, ListSummary, MemberProfile, StepStatus,
};

/// An in-memory board source that records every call it receives.
///
/// Calls are logged as `op` or `op:id` (e.g. `cards:b1`); the same keys are
/// used to inject failures.
#[derive(Default)]
pub struct MockSource {
    boards: Vec<Board>,
    board_members: HashMap<String, Vec<MemberProfile>>,
    cards: HashMap<String, Vec<Card>>,
    profiles: HashMap<String, MemberProfile>,
    lists: HashMap<String, ListSummary>,
    comments: HashMap<String, Vec<Comment>>,
    checklists: HashMap<String, Vec<ChecklistItem>>,
    failures: HashMap<String, bool>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_board(mut self, id: &str, name: &str) -> Self {
        self.boards.push(Board {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_board_member(mut self, board_id: &str, member_id: &str, full_name: &str) -> Self {
        self.board_members
            .entry(board_id.into())
            .or_default()
            .push(MemberProfile {
                id: Some(member_id.into()),
                full_name: Some(full_name.into()),
                ..Default::default()
            });
        self
    }

    pub fn with_card(mut self, board_id: &str, card: Card) -> Self {
        self.cards.entry(board_id.into()).or_default().push(card);
        self
    }

    pub fn with_profile(mut self, member_id: &str, profile: MemberProfile) -> Self {
        self.profiles.insert(member_id.into(), profile);
        self
    }

    pub fn with_list(mut self, list_id: &str, name: &str) -> Self {
        self.lists.insert(
            list_id.into(),
            ListSummary {
                id: Some(list_id.into()),
                name: Some(name.into()),
            },
        );
        self
    }

    pub fn with_comment(mut self, card_id: &str, author: &str, date: &str, text: &str) -> Self {
        self.comments.entry(card_id.into()).or_default().push(Comment {
            author: author.into(),
            date: date.into(),
            text: text.into(),
        });
        self
    }

    pub fn with_item(mut self, card_id: &str, item: ChecklistItem) -> Self {
        self.checklists.entry(card_id.into()).or_default().push(item);
        self
    }

    /// Make the call logged as `key` fail. A malformed failure simulates an
    /// unparseable payload, otherwise an HTTP 500.
    pub fn with_failure(mut self, key: &str, malformed: bool) -> Self {
        self.failures.insert(key.into(), malformed);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, key: String) -> FetchResult<()> {
        self.calls.lock().unwrap().push(key.clone());
        match self.failures.get(&key) {
            Some(true) => Err(FetchError::Decode(format!("missing field in {key}"))),
            Some(false) => Err(FetchError::Status(500)),
            None => Ok(()),
        }
    }
}

pub fn make_card(id: &str, name: &str, list: Option<&str>) -> Card {
    Card {
        id: id.into(),
        name: name.into(),
        short_url: format!("https://trello.com/c/{id}"),
        closed: false,
        members: Vec::new(),
        list: list.map(|name| ListSummary {
            id: None,
            name: Some(name.into()),
        }),
        id_list: None,
    }
}

pub fn make_item(name: &str, status: StepStatus, assignees: &[&str], due: Option<&str>) -> ChecklistItem {
    ChecklistItem {
        name: name.into(),
        status,
        assignee_ids: assignees.iter().map(|s| s.to_string()).collect(),
        due: due.map(String::from),
    }
}

#[async_trait]
impl BoardSource for MockSource {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn fetch_boards(&self) -> FetchResult<Vec<Board>> {
        self.record("boards".into())?;
        Ok(self.boards.clone())
    }

    async fn fetch_board_members(&self, board_id: &str) -> FetchResult<Vec<MemberProfile>> {
        self.record(format!("members:{board_id}"))?;
        Ok(self.board_members.get(board_id).cloned().unwrap_or_default())
    }

    async fn fetch_cards(&self, board_id: &str) -> FetchResult<Vec<Card>> {
        self.record(format!("cards:{board_id}"))?;
        Ok(self.cards.get(board_id).cloned().unwrap_or_default())
    }

    async fn fetch_member(&self, member_id: &str) -> FetchResult<MemberProfile> {
        self.record(format!("member:{member_id}"))?;
        self.profiles
            .get(member_id)
            .cloned()
            .ok_or(FetchError::Status(404))
    }

    async fn fetch_list(&self, list_id: &str) -> FetchResult<ListSummary> {
        self.record(format!("list:{list_id}"))?;
        self.lists.get(list_id).cloned().ok_or(FetchError::Status(404))
    }

    async fn fetch_card_comments(&self, card_id: &str) -> FetchResult<Vec<Comment>> {
        self.record(format!("comments:{card_id}"))?;
        Ok(self.comments.get(card_id).cloned().unwrap_or_default())
    }

    async fn fetch_checklist_items(&self, card_id: &str) -> FetchResult<Vec<ChecklistItem>> {
        self.record(format!("checklists:{card_id}"))?;
        Ok(self.checklists.get(card_id).cloned().unwrap_or_default())
    }
}

#[tokio::test]
async fn mock_records_calls_in_order() {
    let source = MockSource::new().with_board("b1", "Acme");
    let calls = source.calls.clone();

    source.fetch_boards().await.unwrap();
    source.fetch_cards("b1").await.unwrap();

    assert_eq!(calls.lock().unwrap().as_slice(), &["boards", "cards:b1"]);
}

#[tokio::test]
async fn mock_injects_failures_by_key() {
    let source = MockSource::new()
        .with_failure("cards:b1", true)
        .with_failure("comments:c1", false);

    assert!(source.fetch_cards("b1").await.unwrap_err().is_malformed());
    assert!(matches!(
        source.fetch_card_comments("c1").await.unwrap_err(),
        FetchError::Status(500)
    ));
    assert!(source.fetch_cards("b2").await.unwrap().is_empty());
}

#[tokio::test]
async fn sources_work_behind_trait_objects() {
    let sources: Vec<Box<dyn BoardSource>> = vec![
        Box::new(MockSource::new().with_board("b1", "Acme")),
        Box::new(MockSource::new()),
    ];

    let matched = sources.iter().find(|s| s.name() == "Mock");
    assert!(matched.is_some());
    let boards = matched.unwrap().fetch_boards().await.unwrap();
    assert_eq!(boards[0].name, "Acme");
}

#[test]
fn fetch_error_messages() {
    assert_eq!(FetchError::Status(404).to_string(), "upstream returned HTTP 404");
    assert_eq!(
        FetchError::Transport("connection refused".into()).to_string(),
        "request failed: connection refused"
    );
    assert!(FetchError::Decode("x".into()).is_malformed());
}
