//! Execution engine for the wopitest WOPI conformance validator.
//!
//! A target endpoint implementing the server side of the WOPI protocol is
//! exercised against a declarative catalog of test cases. For each case the
//! engine performs an ordered sequence of requests, binds values extracted
//! from earlier responses into later ones, applies validators to each
//! response, and reports Pass/Fail/Skipped per case.
//!
//! The pieces, leaves first:
//! - [`proof_key`]: canonical pre-signing bytes and RSA-SHA256 proof
//!   signatures, plus the public parameters for discovery.
//! - [`template`] + [`state`]: `{name}` substitution over the per-case
//!   state map.
//! - [`resources`]: fixture documents used as test subjects.
//! - [`validators`] + [`savers`]: predicates over captured responses, and
//!   the state writers that feed later requests.
//! - [`request`] / [`executor`]: one HTTP exchange, one case.
//! - [`filter`] / [`outcome`]: case selection and result aggregation.
//! - [`catalog`]: the XML catalog parser and resolver.
//!
//! Runs are strictly sequential: cases execute one after another and each
//! request completes before the next is issued. Nothing is retried.

pub mod capture;
pub mod case;
pub mod catalog;
pub mod client;
pub mod discovery;
pub mod executor;
pub mod filter;
pub mod outcome;
pub mod proof_key;
pub mod request;
pub mod resources;
pub mod savers;
pub mod state;
pub mod template;
pub mod validators;
pub mod wire;

pub use {
    case::{Category, TestCase, TestGroup},
    catalog::{Catalog, CatalogError},
    client::WopiClient,
    executor::{CaseExecutor, RunConfig},
    filter::{CategoryFilter, TestFilter},
    outcome::{CaseResult, CaseStatus, RunSummary},
    proof_key::ProofKeyPair,
};
