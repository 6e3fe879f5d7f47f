use serde::{Deserialize, Serialize};

/// The working selection: one contact (by email) linked to one deal.
///
/// Missing fields deserialize to empty strings so older or partial
/// snapshots still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub deal_id: String,
}

impl Association {
    pub fn new(email: impl Into<String>, deal_id: impl Into<String>) -> Self {
        Self { email: email.into(), deal_id: deal_id.into() }
    }

    /// Fields present in `patch` replace ours; absent ones are kept.
    pub fn merged(&self, patch: &AssociationPatch) -> Self {
        Self {
            email: patch.email.clone().unwrap_or_else(|| self.email.clone()),
            deal_id: patch.deal_id.clone().unwrap_or_else(|| self.deal_id.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.deal_id.is_empty()
    }

    /// Both halves selected; required before linking server-side.
    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.deal_id.is_empty()
    }
}

/// Partial update for [`Association`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
}

impl AssociationPatch {
    pub fn email(email: impl Into<String>) -> Self {
        Self { email: Some(email.into()), deal_id: None }
    }

    pub fn deal(deal_id: impl Into<String>) -> Self {
        Self { email: None, deal_id: Some(deal_id.into()) }
    }

    pub fn with_deal(mut self, deal_id: impl Into<String>) -> Self {
        self.deal_id = Some(deal_id.into());
        self
    }
}

/// An association as persisted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAssociation {
    pub id: i64,
    pub email: String,
    pub deal_id: String,
}

/// Body returned by `POST /association/create/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkResponse {
    pub success: bool,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body returned by `GET /association/all/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinksResponse {
    pub success: bool,
    #[serde(default)]
    pub associations: Vec<StoredAssociation>,
    #[serde(default)]
    pub error: Option<String>,
}
