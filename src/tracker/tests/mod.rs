//! Unit tests for the tracker module.
//!
//! Domain tests cover validation and partitioning rules; service tests drive
//! the services over the in-memory adapters; auth tests use a mocked session
//! store to pin down session lifecycle calls.

mod worker_service_tests;
