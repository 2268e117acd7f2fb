//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::lead::{Lead, NewLead, StatusBucket, UpdateLead};
use crate::domain::query::{LeadFilter, LeadSort};
use crate::domain::types::LeadId;
use crate::repository::errors::RepositoryResult;
use crate::repository::{LeadReader, LeadWriter};

mock! {
    pub Repository {}

    impl LeadReader for Repository {
        fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>>;
        fn find_leads(
            &self,
            filter: &LeadFilter,
            sort: LeadSort,
            skip: usize,
            limit: usize,
        ) -> RepositoryResult<Vec<Lead>>;
        fn count_leads(&self, filter: &LeadFilter) -> RepositoryResult<usize>;
        fn aggregate_lead_stats(&self, filter: &LeadFilter) -> RepositoryResult<Vec<StatusBucket>>;
    }

    impl LeadWriter for Repository {
        fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead>;
        fn update_lead(&self, id: LeadId, updates: &UpdateLead) -> RepositoryResult<Lead>;
        fn delete_lead(&self, id: LeadId) -> RepositoryResult<()>;
    }
}
