use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactProperties {
    #[serde(default)]
    pub createdate: Option<String>,
    pub email: String,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub hs_object_id: Option<String>,
    #[serde(default)]
    pub lastmodifieddate: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub lifecyclestage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub properties: ContactProperties,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
}

impl Contact {
    pub fn email(&self) -> &str {
        &self.properties.email
    }

    pub fn display_name(&self) -> String {
        let first = self.properties.firstname.as_deref().unwrap_or("");
        let last = self.properties.lastname.as_deref().unwrap_or("");
        format!("{first} {last}").trim().to_string()
    }

    /// Case-insensitive substring match on first name, last name and email.
    /// An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            self.properties.firstname.as_deref(),
            self.properties.lastname.as_deref(),
            Some(self.properties.email.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Body returned by `GET /api/private/crm/contacts/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsResponse {
    #[serde(default)]
    pub contacts: Vec<Contact>,
}
