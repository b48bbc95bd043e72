use serde::{Deserialize, Serialize};

/// One flattened row: a checklist item of a card, with the card's shared fields repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "Client_Name")]
    pub client_name: String,
    #[serde(rename = "Project_Name")]
    pub project_name: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Assigned_To")]
    pub assigned_to: String,
    #[serde(rename = "Step")]
    pub step: String,
    #[serde(rename = "Step_Assigned_To")]
    pub step_assigned_to: String,
    #[serde(rename = "Step_Status")]
    pub step_status: String,
    #[serde(rename = "Due_Date")]
    pub due_date: String,
    #[serde(rename = "Trello_Card_Link")]
    pub trello_card_link: String,
    #[serde(rename = "Comment")]
    pub comment: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}
