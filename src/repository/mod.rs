use crate::db::{DbConnection, DbPool};
use crate::domain::lead::{Lead, NewLead, StatusBucket, UpdateLead};
use crate::domain::query::{LeadFilter, LeadSort};
use crate::domain::types::LeadId;
use crate::repository::errors::RepositoryResult;

pub mod errors;
pub mod lead;
#[cfg(feature = "test-mocks")]
pub mod mock;

/// Diesel-backed record store shared by every request handler.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read side of the lead store.
///
/// A listing issues [`LeadReader::find_leads`] and [`LeadReader::count_leads`]
/// as two separate reads; they are not guaranteed to observe the same snapshot
/// when writes interleave.
pub trait LeadReader {
    fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>>;
    /// Returns at most `limit` leads after skipping `skip`, in `sort` order.
    fn find_leads(
        &self,
        filter: &LeadFilter,
        sort: LeadSort,
        skip: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Lead>>;
    fn count_leads(&self, filter: &LeadFilter) -> RepositoryResult<usize>;
    /// Groups matching leads by status. Statuses with no leads are omitted.
    fn aggregate_lead_stats(&self, filter: &LeadFilter) -> RepositoryResult<Vec<StatusBucket>>;
}

/// Write side of the lead store. Each call is a single atomic statement.
pub trait LeadWriter {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead>;
    /// Applies the patch and refreshes `updated_at`/`last_activity_at`.
    fn update_lead(&self, id: LeadId, updates: &UpdateLead) -> RepositoryResult<Lead>;
    fn delete_lead(&self, id: LeadId) -> RepositoryResult<()>;
}
