use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use urlencoding::encode;

use super::{BoardSource, FetchError, FetchResult};
use crate::config::TrelloCredentials;
use crate::model::board::{
    Board, Card, ChecklistItem, Comment, ListSummary, MemberProfile, StepStatus, UNKNOWN_MEMBER,
};

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

pub struct TrelloClient {
    credentials: TrelloCredentials,
    base_url: String,
    client: reqwest::Client,
}

impl TrelloClient {
    pub fn new(
        credentials: TrelloCredentials,
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            credentials,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    fn auth_params(&self) -> [(&str, &str); 2] {
        [
            ("key", &self.credentials.api_key),
            ("token", &self.credentials.token),
        ]
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> FetchResult<T> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%path, "GET");

        let response = self
            .client
            .get(&url)
            .query(&self.auth_params())
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Action {
    #[serde(rename = "type")]
    kind: Option<String>,
    data: Option<ActionData>,
    member_creator: Option<ActionCreator>,
    date: Option<String>,
}

#[derive(Deserialize)]
struct ActionData {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionCreator {
    full_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Checklist {
    #[serde(default)]
    check_items: Vec<CheckItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckItem {
    name: String,
    state: String,
    id_members: Option<Vec<String>>,
    id_member: Option<String>,
    due: Option<String>,
}

const COMMENT_ACTION: &str = "commentCard";

impl From<Action> for Comment {
    fn from(action: Action) -> Self {
        let date = action.date.unwrap_or_default();
        Comment {
            author: action
                .member_creator
                .and_then(|m| m.full_name)
                .unwrap_or_else(|| UNKNOWN_MEMBER.to_string()),
            date: date.chars().take(10).collect(),
            text: action.data.and_then(|d| d.text).unwrap_or_default(),
        }
    }
}

impl From<CheckItem> for ChecklistItem {
    fn from(item: CheckItem) -> Self {
        let assignee_ids = match (item.id_members, item.id_member) {
            (Some(ids), _) if !ids.is_empty() => ids,
            (_, Some(id)) if !id.is_empty() => vec![id],
            _ => Vec::new(),
        };
        ChecklistItem {
            name: item.name,
            status: StepStatus::from_state(&item.state),
            assignee_ids,
            due: item.due.filter(|d| !d.is_empty()),
        }
    }
}

#[async_trait]
impl BoardSource for TrelloClient {
    fn name(&self) -> &str {
        "Trello"
    }

    async fn fetch_boards(&self) -> FetchResult<Vec<Board>> {
        self.get("/members/me/boards", &[]).await
    }

    async fn fetch_board_members(&self, board_id: &str) -> FetchResult<Vec<MemberProfile>> {
        self.get(&format!("/boards/{}/members", encode(board_id)), &[])
            .await
    }

    async fn fetch_cards(&self, board_id: &str) -> FetchResult<Vec<Card>> {
        self.get(
            &format!("/boards/{}/cards", encode(board_id)),
            &[("members", "true"), ("list", "true")],
        )
        .await
    }

    async fn fetch_member(&self, member_id: &str) -> FetchResult<MemberProfile> {
        self.get(&format!("/members/{}", encode(member_id)), &[])
            .await
    }

    async fn fetch_list(&self, list_id: &str) -> FetchResult<ListSummary> {
        self.get(&format!("/lists/{}", encode(list_id)), &[]).await
    }

    async fn fetch_card_comments(&self, card_id: &str) -> FetchResult<Vec<Comment>> {
        let actions: Vec<Action> = self
            .get(
                &format!("/cards/{}/actions", encode(card_id)),
                &[("filter", COMMENT_ACTION)],
            )
            .await?;

        Ok(actions
            .into_iter()
            .filter(|a| a.kind.as_deref() == Some(COMMENT_ACTION))
            .map(Comment::from)
            .collect())
    }

    async fn fetch_checklist_items(&self, card_id: &str) -> FetchResult<Vec<ChecklistItem>> {
        let checklists: Vec<Checklist> = self
            .get(&format!("/cards/{}/checklists", encode(card_id)), &[])
            .await?;

        Ok(checklists
            .into_iter()
            .flat_map(|c| c.check_items)
            .map(ChecklistItem::from)
            .collect())
    }
}
