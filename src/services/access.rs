//! Visibility rules: admins see every lead, everyone else only their own.

use crate::domain::auth::Caller;
use crate::domain::lead::Lead;
use crate::domain::query::LeadFilter;
use crate::domain::types::LeadId;
use crate::repository::LeadReader;
use crate::services::{ServiceError, ServiceResult};

/// Narrows `filter` to the leads `caller` may see.
///
/// For non-admins the owner constraint is overwritten with the caller's id,
/// whatever the filter held before.
pub fn scope_filter(mut filter: LeadFilter, caller: &Caller) -> LeadFilter {
    if !caller.is_admin() {
        filter.created_by = Some(caller.id);
    }
    filter
}

pub fn can_access(caller: &Caller, lead: &Lead) -> bool {
    caller.is_admin() || lead.is_owned_by(caller.id)
}

pub fn ensure_active(caller: &Caller) -> ServiceResult<()> {
    if caller.active {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Fetches a lead for `caller`. A missing lead is `NotFound` even when the
/// caller could never have seen it; an existing lead owned by someone else
/// is `AccessDenied`.
pub fn load_accessible_lead<R>(repo: &R, caller: &Caller, id: LeadId) -> ServiceResult<Lead>
where
    R: LeadReader + ?Sized,
{
    let lead = repo.get_lead_by_id(id)?.ok_or(ServiceError::NotFound)?;

    if !can_access(caller, &lead) {
        log::warn!("User {} denied access to lead {}", caller.id, lead.id);
        return Err(ServiceError::AccessDenied);
    }

    Ok(lead)
}
