//! Application settings document.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub notifications: NotificationSettings,
    pub integrations: Integrations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub task_added: bool,
    pub task_overdue: bool,
    pub daily_summary: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            task_added: true,
            task_overdue: true,
            daily_summary: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Integrations {
    pub gmail: GmailSettings,
    pub webhooks: WebhookSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GmailSettings {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookSettings {
    pub inbound_url: String,
    /// Example inbound payload the mappings were authored against.
    pub reference_payload: serde_json::Value,
    pub mappings: Vec<WebhookMapping>,
    pub outbound_urls: Vec<String>,
    pub triggers: WebhookTriggers,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            inbound_url: String::new(),
            reference_payload: serde_json::Value::Object(serde_json::Map::new()),
            mappings: Vec::new(),
            outbound_urls: Vec::new(),
            triggers: WebhookTriggers::default(),
        }
    }
}

/// Maps one inbound payload path onto one task field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookMapping {
    pub source: String,
    pub target: String,
}

/// Which events fire outbound webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookTriggers {
    pub task_completed: bool,
    pub task_in_progress: bool,
    pub task_overdue: bool,
    pub job_in_progress: bool,
    pub job_needs_assistance: bool,
}

impl Default for WebhookTriggers {
    fn default() -> Self {
        Self {
            task_completed: true,
            task_in_progress: false,
            task_overdue: true,
            job_in_progress: false,
            job_needs_assistance: true,
        }
    }
}
