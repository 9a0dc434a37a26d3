use log::info;
use serde_json::Value;
use std::fs;
use std::path::{ Path, PathBuf };

use crate::error::AgentError;
use crate::models::document::Document;
use crate::models::profile::Profile;

/// Anything that can produce the full list of profile records.
pub trait ProfileSource: Send + Sync {
    fn load(&self) -> Result<Vec<Profile>, AgentError>;
}

/// Profiles stored as a top-level JSON array in a file.
#[derive(Debug, Clone)]
pub struct JsonFileProfiles {
    path: PathBuf,
}

impl JsonFileProfiles {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProfileSource for JsonFileProfiles {
    fn load(&self) -> Result<Vec<Profile>, AgentError> {
        load_profiles(&self.path)
    }
}

pub fn load_profiles<P: AsRef<Path>>(path: P) -> Result<Vec<Profile>, AgentError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let profiles: Vec<Profile> = serde_json::from_str(&content)?;
    info!("Loaded {} profiles from {}", profiles.len(), path.display());
    Ok(profiles)
}

/// Flattens a profile into a labelled text body with `{"email": ...}` metadata.
pub fn profile_to_document(profile: &Profile) -> Result<Document, AgentError> {
    let name = field_text(&profile.name).ok_or(AgentError::MissingField("name"))?;
    let email = field_text(&profile.email).ok_or(AgentError::MissingField("email"))?;
    let skills = match &profile.skills {
        Some(Value::Array(items)) =>
            items.iter().map(render_value).collect::<Vec<_>>().join(", "),
        other => field_text(other).unwrap_or_default(),
    };

    let fields: [(&str, String); 9] = [
        ("Name", name),
        ("Email", email.clone()),
        ("Region", field_text(&profile.region).unwrap_or_default()),
        ("Designation", field_text(&profile.designation).unwrap_or_default()),
        ("Category Expertise", field_text(&profile.category_expertise).unwrap_or_default()),
        ("Engagement Status", field_text(&profile.engagement_status).unwrap_or_default()),
        ("Industry", field_text(&profile.industry).unwrap_or_default()),
        ("Summary", field_text(&profile.summary).unwrap_or_default()),
        ("Skills", skills),
    ];

    let mut page_content = String::new();
    for (label, value) in fields {
        page_content.push_str(&format!("{} = {}\n", label, value));
    }

    Ok(Document::new(page_content).with_metadata("email", email))
}

pub fn profiles_to_documents(profiles: &[Profile]) -> Result<Vec<Document>, AgentError> {
    profiles.iter().map(profile_to_document).collect()
}

/// Absent and `null` fields are both `None`.
fn field_text(field: &Option<Value>) -> Option<String> {
    match field {
        None | Some(Value::Null) => None,
        Some(value) => Some(render_value(value)),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
