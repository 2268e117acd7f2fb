use leadbook::domain::auth::{Caller, Role};
use leadbook::domain::types::LeadStatus;
use leadbook::forms::leads::{CreateLeadForm, LeadListParams, UpdateLeadForm};
use leadbook::repository::LeadWriter;
use leadbook::services::ServiceError;
use leadbook::services::leads::{
    create_lead, delete_lead, get_lead, lead_stats, list_leads, update_lead,
};

mod common;

use common::{new_lead, user_id, with_status};

fn admin() -> Caller {
    Caller::new(user_id(1), Role::Admin)
}

fn user(id: i32) -> Caller {
    Caller::new(user_id(id), Role::User)
}

fn params(query: &str) -> LeadListParams {
    serde_html_form::from_str(query).expect("valid query string")
}

fn create_form(email: &str) -> CreateLeadForm {
    serde_json::from_value(serde_json::json!({
        "firstName": "Katherine",
        "lastName": "Johnson",
        "email": email,
        "phone": "+17575550100",
        "company": "NASA",
        "city": "Hampton",
        "state": "VA",
        "source": "referral"
    }))
    .expect("valid create form")
}

/// Seeds leads for users 2 and 3 with a mix of statuses and scores.
fn seed(repo: &impl LeadWriter) {
    let rows = [
        ("u2-won-high@example.com", 2, LeadStatus::Won, 95, 5000.0),
        ("u2-won-low@example.com", 2, LeadStatus::Won, 60, 1000.0),
        ("u2-new@example.com", 2, LeadStatus::New, 85, 300.0),
        ("u3-won-high@example.com", 3, LeadStatus::Won, 90, 7000.0),
        ("u3-lost@example.com", 3, LeadStatus::Lost, 10, 0.0),
    ];
    for (email, owner, status, score, value) in rows {
        repo.create_lead(&with_status(new_lead(email, owner), status, score, value))
            .expect("seed lead");
    }
}

#[test]
fn test_user_list_is_scoped_to_own_leads() {
    let test_db = common::TestDb::new("test_user_list_scoped.db");
    let repo = test_db.repo();
    seed(&repo);

    let page = list_leads(
        &repo,
        &user(2),
        &params("status=won&scoreMin=80&page=1&limit=10"),
    )
    .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].email.as_str(), "u2-won-high@example.com");
    assert_eq!(page.pagination.total, 1);

    // A requested owner is ignored for regular users.
    let spoofed = list_leads(&repo, &user(2), &params("createdBy=3")).unwrap();
    assert_eq!(spoofed.pagination.total, 3);
    assert!(spoofed.data.iter().all(|lead| lead.created_by == user_id(2)));

    let everything = list_leads(&repo, &admin(), &params("")).unwrap();
    assert_eq!(everything.pagination.total, 5);
}

#[test]
fn test_list_clamps_limit_and_defaults_sort() {
    let test_db = common::TestDb::new("test_list_clamps.db");
    let repo = test_db.repo();
    seed(&repo);

    let page = list_leads(&repo, &admin(), &params("limit=500&sortBy=bogusField")).unwrap();
    assert_eq!(page.pagination.limit, 100);
    assert_eq!(page.pagination.total_pages, 1);
    assert!(!page.pagination.has_next);
    assert!(!page.pagination.has_prev);

    let created: Vec<_> = page.data.iter().map(|lead| lead.created_at).collect();
    let mut sorted = created.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(created, sorted);

    let by_score = list_leads(&repo, &admin(), &params("sortBy=score&sortOrder=asc")).unwrap();
    let scores: Vec<i32> = by_score.data.iter().map(|lead| lead.score.get()).collect();
    assert_eq!(scores, vec![10, 60, 85, 90, 95]);
}

#[test]
fn test_pages_past_the_end_are_empty() {
    let test_db = common::TestDb::new("test_pages_past_end.db");
    let repo = test_db.repo();
    seed(&repo);

    let page = list_leads(&repo, &admin(), &params("page=2&limit=2")).unwrap();
    assert_eq!(page.data.len(), 2);
    assert!(page.pagination.has_next);
    assert!(page.pagination.has_prev);

    let beyond = list_leads(&repo, &admin(), &params("page=9&limit=2")).unwrap();
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.pagination.total_pages, 3);
    assert!(!beyond.pagination.has_next);
    assert!(beyond.pagination.has_prev);

    let none = list_leads(&repo, &user(4), &params("page=2")).unwrap();
    assert_eq!(none.pagination.total, 0);
    assert_eq!(none.pagination.total_pages, 0);
    assert!(!none.pagination.has_next);
    assert!(none.pagination.has_prev);
}

#[test]
fn test_create_assigns_owner_and_rejects_duplicates() {
    let test_db = common::TestDb::new("test_create_owner.db");
    let repo = test_db.repo();

    let lead = create_lead(&repo, &user(5), create_form("kj@nasa.gov")).unwrap();
    assert_eq!(lead.created_by, user_id(5));
    assert_eq!(lead.status, LeadStatus::New);
    assert!(lead.last_activity_at.is_none());

    let duplicate = create_lead(&repo, &user(6), create_form("KJ@NASA.gov"));
    assert!(matches!(duplicate, Err(ServiceError::DuplicateEmail)));

    let invalid = create_lead(&repo, &user(5), create_form("not-an-email"));
    match invalid {
        Err(ServiceError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "email");
            assert_eq!(errors[0].value, serde_json::json!("not-an-email"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_existence_is_checked_before_ownership() {
    let test_db = common::TestDb::new("test_existence_first.db");
    let repo = test_db.repo();

    let lead = create_lead(&repo, &user(2), create_form("owned@example.com")).unwrap();
    let id = lead.id.get();
    let patch = || UpdateLeadForm {
        status: Some("contacted".to_string()),
        ..Default::default()
    };

    assert!(matches!(
        update_lead(&repo, &user(3), id, patch()),
        Err(ServiceError::AccessDenied)
    ));
    assert!(matches!(
        update_lead(&repo, &user(3), id + 100, patch()),
        Err(ServiceError::NotFound)
    ));
    assert!(matches!(
        get_lead(&repo, &user(3), id),
        Err(ServiceError::AccessDenied)
    ));
    assert!(matches!(
        delete_lead(&repo, &user(3), id),
        Err(ServiceError::AccessDenied)
    ));

    let updated = update_lead(&repo, &admin(), id, patch()).unwrap();
    assert_eq!(updated.status, LeadStatus::Contacted);
    assert!(updated.last_activity_at.is_some());

    delete_lead(&repo, &user(2), id).unwrap();
    assert!(matches!(
        get_lead(&repo, &user(2), id),
        Err(ServiceError::NotFound)
    ));
}

#[test]
fn test_empty_update_keeps_timestamps() {
    let test_db = common::TestDb::new("test_empty_update.db");
    let repo = test_db.repo();

    let lead = create_lead(&repo, &user(2), create_form("still@example.com")).unwrap();
    let unchanged = update_lead(&repo, &user(2), lead.id.get(), UpdateLeadForm::default()).unwrap();
    assert_eq!(unchanged, lead);
}

#[test]
fn test_stats_match_list_scope() {
    let test_db = common::TestDb::new("test_stats_scope.db");
    let repo = test_db.repo();
    seed(&repo);

    let stats = lead_stats(&repo, &user(2)).unwrap();
    let listed = list_leads(&repo, &user(2), &params("")).unwrap();
    assert_eq!(stats.total as usize, listed.pagination.total);
    assert_eq!(stats.won, 2);
    assert_eq!(stats.new, 1);
    assert_eq!(stats.total_value, 6300.0);
    assert_eq!(
        stats.new + stats.contacted + stats.qualified + stats.won + stats.lost,
        stats.total
    );

    let all = lead_stats(&repo, &admin()).unwrap();
    assert_eq!(all.total, 5);
    assert_eq!(all.avg_score, 68.0);

    let empty = lead_stats(&repo, &user(9)).unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.avg_score, 0.0);
}
