#![allow(dead_code)]

use std::path::PathBuf;

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use leadbook::db::{DbPool, establish_connection_pool};
use leadbook::domain::lead::NewLead;
use leadbook::domain::types::{
    CityName, CompanyName, FirstName, LastName, LeadEmail, LeadNotes, LeadScore, LeadSource,
    LeadStatus, LeadValue, PhoneNumber, StateName, UserId,
};
use leadbook::repository::DieselRepository;
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// A migrated SQLite database living in a temporary directory.
pub struct TestDb {
    pool: DbPool,
    path: PathBuf,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("build pool");

        let mut conn = pool.get().expect("get connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("run migrations");

        Self {
            pool,
            path,
            _dir: dir,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

pub fn user_id(id: i32) -> UserId {
    UserId::new(id).expect("valid user id")
}

/// A valid lead owned by `owner`; callers override what they need.
pub fn new_lead(email: &str, owner: i32) -> NewLead {
    NewLead {
        first_name: FirstName::new("Test").unwrap(),
        last_name: LastName::new("Lead").unwrap(),
        email: LeadEmail::new(email).unwrap(),
        phone: PhoneNumber::new("+15551230000").unwrap(),
        company: CompanyName::new("Acme").unwrap(),
        city: CityName::new("Springfield").unwrap(),
        state: StateName::new("IL").unwrap(),
        source: LeadSource::Website,
        status: LeadStatus::New,
        score: LeadScore::new(0).unwrap(),
        lead_value: LeadValue::new(0.0).unwrap(),
        is_qualified: false,
        notes: LeadNotes::default(),
        created_by: user_id(owner),
    }
}

pub fn with_status(mut lead: NewLead, status: LeadStatus, score: i32, value: f64) -> NewLead {
    lead.status = status;
    lead.score = LeadScore::new(score).unwrap();
    lead.lead_value = LeadValue::new(value).unwrap();
    lead
}
