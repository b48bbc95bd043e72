use serde::Deserialize;

pub const UNKNOWN_MEMBER: &str = "Unknown";
pub const UNKNOWN_LIST: &str = "Unknown List";

#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
}

/// A member record as returned by `/members/{id}` and `/boards/{id}/members`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
}

impl MemberProfile {
    /// Full name, then username, then display name. Blank values are skipped.
    pub fn resolved_name(&self) -> String {
        [&self.full_name, &self.username, &self.display_name]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_MEMBER.to_string())
    }

    /// Name shown in a card's `Assigned_To` column: a non-blank full name,
    /// otherwise the username as given (even blank), otherwise "Unknown".
    pub fn card_name(&self) -> String {
        match &self.full_name {
            Some(full) if !full.is_empty() => full.clone(),
            _ => self
                .username
                .clone()
                .unwrap_or_else(|| UNKNOWN_MEMBER.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSummary {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub short_url: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub members: Vec<MemberProfile>,
    pub list: Option<ListSummary>,
    pub id_list: Option<String>,
}

impl Card {
    /// Comma-joined names of the members embedded in the card; empty if none.
    pub fn assigned_to(&self) -> String {
        self.members
            .iter()
            .map(MemberProfile::card_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub author: String,
    /// Day granularity, `YYYY-MM-DD`.
    pub date: String,
    pub text: String,
}

impl Comment {
    pub fn render(&self) -> String {
        format!("{} ({}): {}", self.author, self.date, self.text)
    }
}

/// Newline-joined rendering of a card's comments.
pub fn join_comments(comments: &[Comment]) -> String {
    comments
        .iter()
        .map(Comment::render)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Complete,
    Pending,
}

impl StepStatus {
    pub fn from_state(state: &str) -> Self {
        if state == "complete" {
            StepStatus::Complete
        } else {
            StepStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Complete => "Complete",
            StepStatus::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistItem {
    pub name: String,
    pub status: StepStatus,
    pub assignee_ids: Vec<String>,
    /// Raw upstream UTC timestamp.
    pub due: Option<String>,
}
