use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::lead::{
    Lead as DomainLead, NewLead as DomainNewLead, UpdateLead as DomainUpdateLead,
};
use crate::domain::types::{
    CityName, CompanyName, FirstName, LastName, LeadEmail, LeadId, LeadNotes, LeadScore,
    LeadSource, LeadStatus, LeadValue, PhoneNumber, StateName, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::leads)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// Diesel model for [`crate::domain::lead::Lead`].
pub struct Lead {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub city: String,
    pub state: String,
    pub source: String,
    pub status: String,
    pub score: i32,
    pub lead_value: f64,
    pub last_activity_at: Option<NaiveDateTime>,
    pub is_qualified: bool,
    pub notes: String,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::leads)]
/// Insertable form of [`Lead`].
pub struct NewLead<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub company: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub source: &'a str,
    pub status: &'a str,
    pub score: i32,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub notes: &'a str,
    pub created_by: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::leads)]
/// Data used when updating a [`Lead`] record. `None` columns are left untouched.
pub struct UpdateLead<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub source: Option<&'a str>,
    pub status: Option<&'a str>,
    pub score: Option<i32>,
    pub lead_value: Option<f64>,
    pub is_qualified: Option<bool>,
    pub notes: Option<&'a str>,
    pub last_activity_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

/// Row of the per-status aggregation query.
pub type StatusAggregateRow = (String, i64, Option<f64>, Option<i64>);

impl TryFrom<Lead> for DomainLead {
    type Error = TypeConstraintError;

    fn try_from(lead: Lead) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LeadId::new(lead.id)?,
            first_name: FirstName::new(lead.first_name)?,
            last_name: LastName::new(lead.last_name)?,
            email: LeadEmail::new(lead.email)?,
            phone: PhoneNumber::new(lead.phone)?,
            company: CompanyName::new(lead.company)?,
            city: CityName::new(lead.city)?,
            state: StateName::new(lead.state)?,
            source: lead.source.parse::<LeadSource>()?,
            status: lead.status.parse::<LeadStatus>()?,
            score: LeadScore::new(lead.score)?,
            lead_value: LeadValue::new(lead.lead_value)?,
            last_activity_at: lead.last_activity_at,
            is_qualified: lead.is_qualified,
            notes: LeadNotes::from_stored(lead.notes),
            created_by: UserId::new(lead.created_by)?,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        })
    }
}

impl<'a> NewLead<'a> {
    /// Borrows the domain payload, stamping both timestamps with `now`.
    pub fn from_domain(lead: &'a DomainNewLead, now: NaiveDateTime) -> Self {
        Self {
            first_name: lead.first_name.as_str(),
            last_name: lead.last_name.as_str(),
            email: lead.email.as_str(),
            phone: lead.phone.as_str(),
            company: lead.company.as_str(),
            city: lead.city.as_str(),
            state: lead.state.as_str(),
            source: lead.source.as_str(),
            status: lead.status.as_str(),
            score: lead.score.get(),
            lead_value: lead.lead_value.get(),
            is_qualified: lead.is_qualified,
            notes: lead.notes.as_str(),
            created_by: lead.created_by.get(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl<'a> UpdateLead<'a> {
    /// Borrows the domain patch and records `now` as the latest activity.
    pub fn from_domain(updates: &'a DomainUpdateLead, now: NaiveDateTime) -> Self {
        Self {
            first_name: updates.first_name.as_ref().map(|v| v.as_str()),
            last_name: updates.last_name.as_ref().map(|v| v.as_str()),
            email: updates.email.as_ref().map(|v| v.as_str()),
            phone: updates.phone.as_ref().map(|v| v.as_str()),
            company: updates.company.as_ref().map(|v| v.as_str()),
            city: updates.city.as_ref().map(|v| v.as_str()),
            state: updates.state.as_ref().map(|v| v.as_str()),
            source: updates.source.map(LeadSource::as_str),
            status: updates.status.map(LeadStatus::as_str),
            score: updates.score.map(LeadScore::get),
            lead_value: updates.lead_value.map(LeadValue::get),
            is_qualified: updates.is_qualified,
            notes: updates.notes.as_ref().map(|v| v.as_str()),
            last_activity_at: Some(now),
            updated_at: now,
        }
    }
}
