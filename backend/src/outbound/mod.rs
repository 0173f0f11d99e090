//! Outbound adapters implementing the domain ports.
//!
//! Only PostgreSQL persistence lives here; the in-memory doubles used by
//! tests are in `test_support`.

pub mod persistence;
