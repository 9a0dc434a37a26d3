use serde::{ Deserialize, Serialize };
use serde_json::{ Map, Value };

/// A profile record as found in the profiles JSON file.
///
/// `name` and `email` are required by document construction but kept optional here so a
/// missing one is reported as a missing field rather than a parse failure. Field values
/// are kept as raw JSON, so a number or boolean is rendered instead of rejected.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub region: Option<Value>,
    #[serde(default)]
    pub designation: Option<Value>,
    #[serde(default)]
    pub category_expertise: Option<Value>,
    #[serde(default)]
    pub engagement_status: Option<Value>,
    #[serde(default)]
    pub industry: Option<Value>,
    #[serde(default)]
    pub summary: Option<Value>,
    #[serde(default)]
    pub skills: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(Value::String(name.into())),
            email: Some(Value::String(email.into())),
            ..Default::default()
        }
    }
}
