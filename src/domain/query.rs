//! Typed pagination, sort and filter specifications for lead listings.

use chrono::NaiveDateTime;

use crate::domain::types::{LeadSource, LeadStatus, UserId};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Page number and page size; always `page >= 1` and `1 <= limit <= 100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl PageRequest {
    /// Builds a request, raising `page` to at least 1 and clamping `limit`.
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    pub const fn page(&self) -> usize {
        self.page
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Number of records preceding this page.
    pub const fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// Columns a listing may be ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    LastActivityAt,
    Score,
    LeadValue,
    FirstName,
    LastName,
    Company,
}

impl SortField {
    /// Looks up an allow-listed field by its wire name.
    pub fn from_param(value: &str) -> Option<Self> {
        Some(match value {
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "lastActivityAt" => SortField::LastActivityAt,
            "score" => SortField::Score,
            "leadValue" => SortField::LeadValue,
            "firstName" => SortField::FirstName,
            "lastName" => SortField::LastName,
            "company" => SortField::Company,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Requested ordering; defaults to newest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeadSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl LeadSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for LeadSort {
    fn default() -> Self {
        Self::new(SortField::CreatedAt, SortDirection::Desc)
    }
}

/// Inclusive bounds; either side may be absent.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Range<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Range<T> {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Constraints applied to a lead listing. Absent fields impose nothing.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LeadFilter {
    /// Case-insensitive substring matches.
    pub email: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub is_qualified: Option<bool>,
    pub score: Range<i32>,
    pub lead_value: Range<f64>,
    pub created_at: Range<NaiveDateTime>,
    pub last_activity_at: Range<NaiveDateTime>,
    /// Ownership constraint; only ever set by access scoping.
    pub created_by: Option<UserId>,
}

impl LeadFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn source(mut self, source: LeadSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn created_by(mut self, user_id: UserId) -> Self {
        self.created_by = Some(user_id);
        self
    }
}

/// Fully normalized listing request.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct LeadListQuery {
    pub filter: LeadFilter,
    pub sort: LeadSort,
    pub page: PageRequest,
}
