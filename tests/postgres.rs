//! `PostgreSQL` adapter integration tests.
//!
//! These run against the database named by `TASKBOARD_TEST_DATABASE_URL`.
//! Every test migrates it, then empties the tracker tables, so point the
//! variable at a disposable database. Without it the tests are skipped.

mod store_contract;

mod postgres {
    pub mod helpers;

    mod migration_tests;
    mod store_tests;
}
