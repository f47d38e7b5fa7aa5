//! # Declarative
//!
//! Diff reconciliation for declaratively managed release sets.
//!
//! After a diff pass, a host controller needs to know which derived outputs
//! (`diff_output`, `apply_output`) it can keep and which are unknown until
//! the next apply. This crate decides that from two facts: whether any
//! tracked input changed, and whether the diff found pending changes.
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{mark_diff_outputs, DiffChecker, RELEASE_SET_INPUT_KEYS};
//!
//! let reconciliation = mark_diff_outputs(&mut plan, &diff_text, RELEASE_SET_INPUT_KEYS)?;
//! if reconciliation.staleness.apply_output {
//!     println!("apply_output: (known after apply)");
//! }
//! ```
//!
//! ## Provider Traits
//!
//! - [`FieldReader`]: reads the resource's configured fields
//! - [`DiffChecker`]: reports changed fields and marks outputs computed
//!
//! The host implements both, so this crate has no dependency on any
//! particular controller framework.

pub mod diff;
pub mod keys;
pub mod resource;
pub mod types;

pub use diff::{changed_inputs, mark_diff_outputs, truncate_diff_output};
pub use keys::{APPLY_OUTPUT, DIFF_OUTPUT, RELEASE_INPUT_KEYS, RELEASE_SET_INPUT_KEYS};
pub use resource::{DiffChecker, FieldReader, FieldReaderExt};
pub use types::{Reconciliation, Staleness};
