//! kinanthro - Compute engine for ISAK anthropometric measurement records
//!
//! kinanthro turns raw measurement trials into reconciled records and records
//! into report payloads through a deterministic pipeline: trial reconciliation
//! → derived metric calculation → z-score normalization → record aggregation
//! → report encoding.
//!
//! ## Modules
//!
//! - **Reconciliation**: ISAK two/three-trial rule per section tolerance
//! - **Derived metrics**: composition, somatotype, distributions, energy, indices
//! - **Aggregation**: current-vs-previous comparison and client history

pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod derived;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod reconciliation;
pub mod reference;
pub mod types;
pub mod zscore;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{ActivityLevel, EngineConfig, MissingDataPolicy, ToleranceConfig};
pub use derived::DerivedCalculator;
pub use error::{ComputeError, ValidationError};
pub use pipeline::{
    finalize_sitting_json, reconcile_sitting_json, records_to_report, AnthropometricEngine,
};
pub use reconciliation::Reconciler;
pub use reference::ReferenceTable;
pub use zscore::ZScoreNormalizer;

/// Engine version embedded in all report payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "kinanthro";
