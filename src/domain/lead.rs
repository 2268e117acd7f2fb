use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::types::{
    CityName, CompanyName, FirstName, LastName, LeadEmail, LeadId, LeadNotes, LeadScore,
    LeadSource, LeadStatus, LeadValue, PhoneNumber, StateName, UserId,
};

/// A sales prospect tracked through the pipeline.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    pub first_name: FirstName,
    pub last_name: LastName,
    pub email: LeadEmail,
    pub phone: PhoneNumber,
    pub company: CompanyName,
    pub city: CityName,
    pub state: StateName,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: LeadScore,
    pub lead_value: LeadValue,
    /// Refreshed on every mutation after creation; `None` until then.
    pub last_activity_at: Option<NaiveDateTime>,
    pub is_qualified: bool,
    pub notes: LeadNotes,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the lead was created by the given caller.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.created_by == user_id
    }
}

/// Payload required to insert a lead.
#[derive(Clone, Debug)]
pub struct NewLead {
    pub first_name: FirstName,
    pub last_name: LastName,
    pub email: LeadEmail,
    pub phone: PhoneNumber,
    pub company: CompanyName,
    pub city: CityName,
    pub state: StateName,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: LeadScore,
    pub lead_value: LeadValue,
    pub is_qualified: bool,
    pub notes: LeadNotes,
    pub created_by: UserId,
}

/// Partial update of a lead. Only fields set to `Some` are written.
///
/// Identity, ownership and timestamps are deliberately absent so they cannot
/// be overwritten through a patch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateLead {
    pub first_name: Option<FirstName>,
    pub last_name: Option<LastName>,
    pub email: Option<LeadEmail>,
    pub phone: Option<PhoneNumber>,
    pub company: Option<CompanyName>,
    pub city: Option<CityName>,
    pub state: Option<StateName>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub score: Option<LeadScore>,
    pub lead_value: Option<LeadValue>,
    pub is_qualified: Option<bool>,
    pub notes: Option<LeadNotes>,
}

impl UpdateLead {
    /// Returns `true` when the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self == &UpdateLead::default()
    }
}

/// Per-status partial aggregate produced by the record store.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBucket {
    pub status: LeadStatus,
    pub count: i64,
    pub value_sum: f64,
    pub score_sum: i64,
}

/// Aggregate figures over the leads visible to a caller.
#[derive(Clone, Debug, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total: i64,
    pub total_value: f64,
    pub avg_score: f64,
    pub new: i64,
    pub contacted: i64,
    pub qualified: i64,
    pub won: i64,
    pub lost: i64,
}

impl LeadStats {
    /// Folds per-status buckets into the final figures.
    ///
    /// Statuses without a bucket count as zero and the average score of an
    /// empty set is `0.0`.
    pub fn from_buckets<I>(buckets: I) -> Self
    where
        I: IntoIterator<Item = StatusBucket>,
    {
        let mut stats = LeadStats::default();
        let mut score_sum: i64 = 0;

        for bucket in buckets {
            stats.total += bucket.count;
            stats.total_value += bucket.value_sum;
            score_sum += bucket.score_sum;

            let slot = match bucket.status {
                LeadStatus::New => &mut stats.new,
                LeadStatus::Contacted => &mut stats.contacted,
                LeadStatus::Qualified => &mut stats.qualified,
                LeadStatus::Won => &mut stats.won,
                LeadStatus::Lost => &mut stats.lost,
            };
            *slot += bucket.count;
        }

        if stats.total > 0 {
            stats.avg_score = score_sum as f64 / stats.total as f64;
        }

        stats
    }
}
