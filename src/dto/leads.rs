//! JSON shapes of leads and lead statistics.

use serde::Serialize;

use crate::domain::lead::{Lead, LeadStats};

/// A lead as exposed over the API, with the derived `fullName`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    #[serde(flatten)]
    pub lead: Lead,
    pub full_name: String,
}

impl From<Lead> for LeadView {
    fn from(lead: Lead) -> Self {
        let full_name = lead.full_name();
        Self { lead, full_name }
    }
}

/// `data` payload of single-lead responses.
#[derive(Debug, Serialize)]
pub struct LeadPayload {
    pub lead: LeadView,
}

impl From<Lead> for LeadPayload {
    fn from(lead: Lead) -> Self {
        Self { lead: lead.into() }
    }
}

/// `data` payload of the statistics response.
#[derive(Debug, Serialize)]
pub struct StatsPayload {
    pub stats: LeadStats,
}
