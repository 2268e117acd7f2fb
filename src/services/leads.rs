//! Lead listing, CRUD and statistics workflows.

use validator::Validate;

use crate::domain::auth::Caller;
use crate::domain::lead::{Lead, LeadStats};
use crate::domain::types::LeadId;
use crate::forms::leads::{CreateLeadForm, LeadListParams, UpdateLeadForm};
use crate::pagination::Paginated;
use crate::repository::{LeadReader, LeadWriter};
use crate::services::access::{ensure_active, load_accessible_lead, scope_filter};
use crate::services::{ServiceError, ServiceResult};

/// An id that cannot name a stored lead is reported as not found.
fn lead_id(raw: i32) -> ServiceResult<LeadId> {
    LeadId::new(raw).map_err(|_| ServiceError::NotFound)
}

/// Returns one page of the leads visible to `caller`.
///
/// The page and the total come from two separate reads.
pub fn list_leads<R>(
    repo: &R,
    caller: &Caller,
    params: &LeadListParams,
) -> ServiceResult<Paginated<Lead>>
where
    R: LeadReader + ?Sized,
{
    ensure_active(caller)?;
    params.validate()?;

    let query = params.normalize();
    let filter = scope_filter(query.filter, caller);

    log::debug!(
        "Listing leads for user {}: sort {:?}, page {}, limit {}",
        caller.id,
        query.sort,
        query.page.page(),
        query.page.limit()
    );

    let leads = repo
        .find_leads(&filter, query.sort, query.page.skip(), query.page.limit())
        .map_err(|e| {
            log::error!("Failed to list leads: {e}");
            ServiceError::from(e)
        })?;
    let total = repo.count_leads(&filter).map_err(|e| {
        log::error!("Failed to count leads: {e}");
        ServiceError::from(e)
    })?;

    Ok(Paginated::new(leads, query.page, total))
}

/// Loads a single lead, existence first, ownership second.
pub fn get_lead<R>(repo: &R, caller: &Caller, id: i32) -> ServiceResult<Lead>
where
    R: LeadReader + ?Sized,
{
    ensure_active(caller)?;
    load_accessible_lead(repo, caller, lead_id(id)?)
}

/// Validates the form and stores a lead owned by `caller`.
pub fn create_lead<R>(repo: &R, caller: &Caller, form: CreateLeadForm) -> ServiceResult<Lead>
where
    R: LeadWriter + ?Sized,
{
    ensure_active(caller)?;

    let form = form.trimmed();
    form.validate()?;
    let new_lead = form.to_new_lead(caller.id)?;

    let lead = repo.create_lead(&new_lead)?;
    log::info!("User {} created lead {}", caller.id, lead.id);

    Ok(lead)
}

/// Applies the fields present in `form` to a lead the caller may access.
///
/// An empty patch leaves the stored lead untouched and returns it.
pub fn update_lead<R>(
    repo: &R,
    caller: &Caller,
    id: i32,
    form: UpdateLeadForm,
) -> ServiceResult<Lead>
where
    R: LeadReader + LeadWriter + ?Sized,
{
    ensure_active(caller)?;

    let form = form.trimmed();
    form.validate()?;
    let patch = form.to_patch()?;

    let lead = load_accessible_lead(repo, caller, lead_id(id)?)?;
    if patch.is_empty() {
        return Ok(lead);
    }

    let updated = repo.update_lead(lead.id, &patch)?;
    log::info!("User {} updated lead {}", caller.id, updated.id);

    Ok(updated)
}

pub fn delete_lead<R>(repo: &R, caller: &Caller, id: i32) -> ServiceResult<()>
where
    R: LeadReader + LeadWriter + ?Sized,
{
    ensure_active(caller)?;

    let lead = load_accessible_lead(repo, caller, lead_id(id)?)?;
    repo.delete_lead(lead.id)?;
    log::info!("User {} deleted lead {}", caller.id, lead.id);

    Ok(())
}

/// Aggregates over exactly the leads the caller would see when listing.
pub fn lead_stats<R>(repo: &R, caller: &Caller) -> ServiceResult<LeadStats>
where
    R: LeadReader + ?Sized,
{
    ensure_active(caller)?;

    let filter = scope_filter(Default::default(), caller);
    let buckets = repo.aggregate_lead_stats(&filter).map_err(|e| {
        log::error!("Failed to aggregate lead stats: {e}");
        ServiceError::from(e)
    })?;

    Ok(LeadStats::from_buckets(buckets))
}
