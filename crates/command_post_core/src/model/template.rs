//! Task/job templates and their declarative completion actions.
//!
//! # Responsibility
//! - Describe template forms and the actions run when a form is submitted.
//! - Check action field mappings against each action kind's declared fields.
//!
//! # Invariants
//! - Action kinds are a closed set; unknown `type` tags load as `Unknown`.
//! - A mapping only names logical fields its action kind declares.
//! - A required field resolves only to a non-blank submitted value.

use crate::model::ids::{impl_record, RecordId};
use crate::model::records::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Submitted form values keyed by form field key.
pub type FormValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Url,
    Password,
}

/// One input on a template form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateField {
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub kind: FieldKind,
    #[serde(deserialize_with = "null_as_default")]
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskTemplate {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fields: Vec<TemplateField>,
    #[serde(deserialize_with = "null_as_default")]
    pub on_complete: Vec<TemplateAction>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobTemplate {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub frequency: crate::model::records::Frequency,
    #[serde(deserialize_with = "null_as_default")]
    pub checklist: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
}

impl_record!(TaskTemplate, JobTemplate);

/// Side effect applied when a template form is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TemplateAction {
    /// Appends a digital asset to the client's partition.
    CreateDigitalAsset {
        #[serde(default)]
        asset_type: String,
        fields: FieldMapping,
    },
    /// Appends a credential to the client's partition.
    CaptureCredentials { fields: FieldMapping },
    /// Upserts `key` in the client's key-value index when the value is present.
    WriteKv { key: String, fields: FieldMapping },
    /// Marks `service` active for the client.
    SetClientServiceActive { service: String },
    /// Any action tag this build does not know; ignored when run.
    #[serde(other)]
    Unknown,
}

impl TemplateAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::CreateDigitalAsset { .. } => ActionKind::CreateDigitalAsset,
            Self::CaptureCredentials { .. } => ActionKind::CaptureCredentials,
            Self::WriteKv { .. } => ActionKind::WriteKv,
            Self::SetClientServiceActive { .. } => ActionKind::SetClientServiceActive,
            Self::Unknown => ActionKind::Unknown,
        }
    }

    pub fn mapping(&self) -> Option<&FieldMapping> {
        match self {
            Self::CreateDigitalAsset { fields, .. }
            | Self::CaptureCredentials { fields }
            | Self::WriteKv { fields, .. } => Some(fields),
            Self::SetClientServiceActive { .. } | Self::Unknown => None,
        }
    }
}

/// Action kind with its declared logical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreateDigitalAsset,
    CaptureCredentials,
    WriteKv,
    SetClientServiceActive,
    Unknown,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateDigitalAsset => "create_digital_asset",
            Self::CaptureCredentials => "capture_credentials",
            Self::WriteKv => "write_kv",
            Self::SetClientServiceActive => "set_client_service_active",
            Self::Unknown => "unknown",
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::CreateDigitalAsset => &["name"],
            Self::CaptureCredentials => &["service", "username"],
            Self::WriteKv => &["value"],
            Self::SetClientServiceActive | Self::Unknown => &[],
        }
    }

    pub fn optional_fields(self) -> &'static [&'static str] {
        match self {
            Self::CreateDigitalAsset => &["url", "notes"],
            Self::CaptureCredentials => &["password", "url"],
            Self::WriteKv | Self::SetClientServiceActive | Self::Unknown => &[],
        }
    }

    fn declares(self, field: &str) -> bool {
        self.required_fields()
            .iter()
            .chain(self.optional_fields())
            .any(|declared| *declared == field)
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical target field → submitted form field key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

/// Problems with a mapping relative to its action kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingIssue {
    MissingRequired(&'static str),
    UndeclaredTarget(String),
}

impl Display for MappingIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired(field) => write!(f, "required field `{field}` is not mapped"),
            Self::UndeclaredTarget(field) => write!(f, "field `{field}` is not declared"),
        }
    }
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of `target ← source`.
    pub fn map(mut self, target: impl Into<String>, source: impl Into<String>) -> Self {
        self.0.insert(target.into(), source.into());
        self
    }

    pub fn source_for(&self, target: &str) -> Option<&str> {
        self.0.get(target).map(String::as_str)
    }

    /// Checks this mapping against `kind`'s declared fields.
    pub fn check(&self, kind: ActionKind) -> Vec<MappingIssue> {
        let mut issues: Vec<MappingIssue> = kind
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !self.0.contains_key(*field))
            .map(MappingIssue::MissingRequired)
            .collect();
        issues.extend(
            self.0
                .keys()
                .filter(|target| !kind.declares(target))
                .map(|target| MappingIssue::UndeclaredTarget(target.clone())),
        );
        issues
    }

    /// Looks up every declared field of `kind` in `form`.
    ///
    /// Returns the names of required fields that are unmapped or blank.
    pub fn resolve(
        &self,
        kind: ActionKind,
        form: &FormValues,
    ) -> Result<ResolvedFields, Vec<&'static str>> {
        let lookup = |field: &str| {
            self.source_for(field)
                .and_then(|source| form.get(source))
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let missing: Vec<&'static str> = kind
            .required_fields()
            .iter()
            .copied()
            .filter(|field| lookup(*field).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let values = kind
            .required_fields()
            .iter()
            .chain(kind.optional_fields())
            .filter_map(|field| lookup(*field).map(|value| (*field, value)))
            .collect();
        Ok(ResolvedFields { values })
    }
}

/// Checked field values for one action run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    values: BTreeMap<&'static str, String>,
}

impl ResolvedFields {
    /// Value for a declared field; `None` for blank optional fields.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Value for a declared required field.
    pub fn required(&self, field: &str) -> &str {
        self.get(field).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionKind, FieldMapping, FormValues, MappingIssue, TemplateAction};
    use serde_json::json;

    fn form(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn unknown_action_tags_load_as_unknown() {
        let actions: Vec<TemplateAction> = serde_json::from_value(json!([
            { "type": "send_slack_message", "channel": "#ops" },
            { "type": "set_client_service_active", "service": "seo" }
        ]))
        .expect("actions");
        assert_eq!(actions[0], TemplateAction::Unknown);
        assert_eq!(actions[1].kind(), ActionKind::SetClientServiceActive);
    }

    #[test]
    fn action_payload_uses_camel_case_fields() {
        let action: TemplateAction = serde_json::from_value(json!({
            "type": "create_digital_asset",
            "assetType": "website",
            "fields": { "name": "siteName", "url": "siteUrl" }
        }))
        .expect("action");
        let TemplateAction::CreateDigitalAsset { asset_type, fields } = action else {
            panic!("expected create_digital_asset");
        };
        assert_eq!(asset_type, "website");
        assert_eq!(fields.source_for("url"), Some("siteUrl"));
    }

    #[test]
    fn check_reports_missing_and_undeclared_targets() {
        let mapping = FieldMapping::new()
            .map("service", "svc")
            .map("pin", "pinCode");
        let issues = mapping.check(ActionKind::CaptureCredentials);
        assert!(issues.contains(&MappingIssue::MissingRequired("username")));
        assert!(issues.contains(&MappingIssue::UndeclaredTarget("pin".to_string())));
    }

    #[test]
    fn resolve_treats_blank_required_values_as_missing() {
        let mapping = FieldMapping::new().map("name", "assetName").map("url", "assetUrl");
        let missing = mapping
            .resolve(
                ActionKind::CreateDigitalAsset,
                &form(&[("assetName", "   "), ("assetUrl", "https://x.test")]),
            )
            .expect_err("blank name must be missing");
        assert_eq!(missing, vec!["name"]);
    }

    #[test]
    fn resolve_trims_values_and_skips_blank_optionals() {
        let mapping = FieldMapping::new()
            .map("name", "assetName")
            .map("url", "assetUrl")
            .map("notes", "assetNotes");
        let resolved = mapping
            .resolve(
                ActionKind::CreateDigitalAsset,
                &form(&[("assetName", " Main site "), ("assetNotes", "")]),
            )
            .expect("resolved");
        assert_eq!(resolved.required("name"), "Main site");
        assert_eq!(resolved.get("url"), None);
        assert_eq!(resolved.get("notes"), None);
    }
}
