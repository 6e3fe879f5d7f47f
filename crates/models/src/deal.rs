use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealProperties {
    #[serde(default)]
    pub dealname: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub dealstage: Option<String>,
    #[serde(default)]
    pub pipeline: Option<String>,
    #[serde(default)]
    pub closedate: Option<String>,
    #[serde(default)]
    pub createdate: Option<String>,
    #[serde(default)]
    pub hs_object_id: Option<String>,
    #[serde(default)]
    pub lastmodifieddate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub properties: DealProperties,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
}

impl Deal {
    pub fn name(&self) -> &str {
        self.properties.dealname.as_deref().unwrap_or("")
    }

    /// Case-insensitive substring match on deal name and id.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.name().to_lowercase().contains(&needle)
            || self.id.to_lowercase().contains(&needle)
    }
}

/// Body returned by `GET /api/private/crm/deals/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealsResponse {
    #[serde(default)]
    pub deals: Vec<Deal>,
}
