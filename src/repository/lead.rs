//! Diesel implementation of the lead store.

use chrono::Utc;
use diesel::dsl::{count_star, sum};
use diesel::expression::IntoSql;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel::sqlite::Sqlite;

use crate::db::fold_case;
use crate::domain::lead::{Lead, NewLead, StatusBucket, UpdateLead};
use crate::domain::query::{LeadFilter, LeadSort, SortDirection, SortField};
use crate::domain::types::{LeadId, LeadStatus};
use crate::models::lead::{
    Lead as DbLead, NewLead as DbNewLead, StatusAggregateRow, UpdateLead as DbUpdateLead,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, LeadReader, LeadWriter};
use crate::schema::leads;

type LeadPredicate = Box<dyn BoxableExpression<leads::table, Sqlite, SqlType = Bool>>;

/// Case-folds the needle and escapes LIKE wildcards so it is matched literally.
fn like_contains(needle: &str) -> String {
    let folded = needle.to_lowercase();
    let mut escaped = String::with_capacity(folded.len() + 2);
    escaped.push('%');
    for ch in folded.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Translates a filter into a single WHERE expression.
fn lead_predicate(filter: &LeadFilter) -> LeadPredicate {
    let mut predicate: LeadPredicate = Box::new(true.into_sql::<Bool>());

    // Both sides are folded so the match ignores case beyond ASCII.
    if let Some(email) = &filter.email {
        predicate = Box::new(
            predicate.and(fold_case(leads::email).like(like_contains(email)).escape('\\')),
        );
    }
    if let Some(company) = &filter.company {
        predicate = Box::new(
            predicate.and(fold_case(leads::company).like(like_contains(company)).escape('\\')),
        );
    }
    if let Some(city) = &filter.city {
        predicate = Box::new(
            predicate.and(fold_case(leads::city).like(like_contains(city)).escape('\\')),
        );
    }
    if let Some(state) = &filter.state {
        predicate = Box::new(
            predicate.and(fold_case(leads::state).like(like_contains(state)).escape('\\')),
        );
    }

    if let Some(status) = filter.status {
        predicate = Box::new(predicate.and(leads::status.eq(status.as_str())));
    }
    if let Some(source) = filter.source {
        predicate = Box::new(predicate.and(leads::source.eq(source.as_str())));
    }
    if let Some(is_qualified) = filter.is_qualified {
        predicate = Box::new(predicate.and(leads::is_qualified.eq(is_qualified)));
    }

    if let Some(min) = filter.score.min {
        predicate = Box::new(predicate.and(leads::score.ge(min)));
    }
    if let Some(max) = filter.score.max {
        predicate = Box::new(predicate.and(leads::score.le(max)));
    }
    if let Some(min) = filter.lead_value.min {
        predicate = Box::new(predicate.and(leads::lead_value.ge(min)));
    }
    if let Some(max) = filter.lead_value.max {
        predicate = Box::new(predicate.and(leads::lead_value.le(max)));
    }

    if let Some(after) = filter.created_at.min {
        predicate = Box::new(predicate.and(leads::created_at.ge(after)));
    }
    if let Some(before) = filter.created_at.max {
        predicate = Box::new(predicate.and(leads::created_at.le(before)));
    }
    // A NULL activity never satisfies a bound.
    if let Some(after) = filter.last_activity_at.min {
        predicate = Box::new(predicate.and(leads::last_activity_at.assume_not_null().ge(after)));
    }
    if let Some(before) = filter.last_activity_at.max {
        predicate = Box::new(predicate.and(leads::last_activity_at.assume_not_null().le(before)));
    }

    if let Some(created_by) = filter.created_by {
        predicate = Box::new(predicate.and(leads::created_by.eq(created_by.get())));
    }

    predicate
}

/// Orders by `$column` and breaks ties on the id in the same direction.
macro_rules! order_by {
    ($query:expr, $column:expr, $direction:expr) => {
        match $direction {
            SortDirection::Asc => $query.order(($column.asc(), leads::id.asc())),
            SortDirection::Desc => $query.order(($column.desc(), leads::id.desc())),
        }
    };
}

fn into_domain(db_lead: DbLead) -> RepositoryResult<Lead> {
    Lead::try_from(db_lead).map_err(RepositoryError::from)
}

impl LeadReader for DieselRepository {
    fn get_lead_by_id(&self, id: LeadId) -> RepositoryResult<Option<Lead>> {
        let mut conn = self.conn()?;

        let db_lead = leads::table
            .find(id.get())
            .select(DbLead::as_select())
            .first::<DbLead>(&mut conn)
            .optional()?;

        db_lead.map(into_domain).transpose()
    }

    fn find_leads(
        &self,
        filter: &LeadFilter,
        sort: LeadSort,
        skip: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<Lead>> {
        let mut conn = self.conn()?;

        let query = leads::table
            .filter(lead_predicate(filter))
            .select(DbLead::as_select())
            .into_boxed();

        let query = match sort.field {
            SortField::CreatedAt => order_by!(query, leads::created_at, sort.direction),
            SortField::UpdatedAt => order_by!(query, leads::updated_at, sort.direction),
            SortField::LastActivityAt => order_by!(query, leads::last_activity_at, sort.direction),
            SortField::Score => order_by!(query, leads::score, sort.direction),
            SortField::LeadValue => order_by!(query, leads::lead_value, sort.direction),
            SortField::FirstName => order_by!(query, leads::first_name, sort.direction),
            SortField::LastName => order_by!(query, leads::last_name, sort.direction),
            SortField::Company => order_by!(query, leads::company, sort.direction),
        };

        query
            .offset(i64::try_from(skip).unwrap_or(i64::MAX))
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .load::<DbLead>(&mut conn)?
            .into_iter()
            .map(into_domain)
            .collect()
    }

    fn count_leads(&self, filter: &LeadFilter) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let total = leads::table
            .filter(lead_predicate(filter))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(total as usize)
    }

    fn aggregate_lead_stats(&self, filter: &LeadFilter) -> RepositoryResult<Vec<StatusBucket>> {
        let mut conn = self.conn()?;

        let rows = leads::table
            .filter(lead_predicate(filter))
            .group_by(leads::status)
            .select((
                leads::status,
                count_star(),
                sum(leads::lead_value),
                sum(leads::score),
            ))
            .load::<StatusAggregateRow>(&mut conn)?;

        rows.into_iter()
            .map(|(status, count, value_sum, score_sum)| -> RepositoryResult<StatusBucket> {
                Ok(StatusBucket {
                    status: status.parse::<LeadStatus>()?,
                    count,
                    value_sum: value_sum.unwrap_or(0.0),
                    score_sum: score_sum.unwrap_or(0),
                })
            })
            .collect()
    }
}

impl LeadWriter for DieselRepository {
    fn create_lead(&self, new_lead: &NewLead) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;

        let now = Utc::now().naive_utc();
        let insertable = DbNewLead::from_domain(new_lead, now);

        let db_lead = diesel::insert_into(leads::table)
            .values(&insertable)
            .returning(DbLead::as_returning())
            .get_result::<DbLead>(&mut conn)?;

        into_domain(db_lead)
    }

    fn update_lead(&self, id: LeadId, updates: &UpdateLead) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;

        let now = Utc::now().naive_utc();
        let changeset = DbUpdateLead::from_domain(updates, now);

        let db_lead = diesel::update(leads::table.find(id.get()))
            .set(&changeset)
            .returning(DbLead::as_returning())
            .get_result::<DbLead>(&mut conn)?;

        into_domain(db_lead)
    }

    fn delete_lead(&self, id: LeadId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(leads::table.find(id.get())).execute(&mut conn)?;
        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
