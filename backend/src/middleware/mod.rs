//! Actix middleware applied to every route.
//!
//! [`Trace`] runs outermost so error responses produced by extractors and
//! handlers already carry the request's trace identifier.

pub mod trace;

pub use trace::Trace;
