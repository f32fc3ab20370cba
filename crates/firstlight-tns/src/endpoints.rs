//! Candidate endpoint suffixes for probing.
//!
//! The registry's exact path is not guaranteed stable across deployments
//! (sandbox vs production), so the client probes an ordered list instead of
//! hard-coding one URL.

/// Submission endpoint candidates, most common naming first.
pub const SUBMIT_CANDIDATES: &[&str] = &[
    "bulk-report",
    "bulk_report",
    "bulkreport",
    "bulk-report/upload",
    "bulk_report/upload",
    // some deployments nest under /bulk
    "bulk/at-report",
    "bulk/at_report",
    "bulk/at",
];

/// Status/retrieval endpoint candidates.
pub const STATUS_CANDIDATES: &[&str] = &[
    "bulk-report/status",
    "bulk_report/status",
    "bulkreport/status",
    "bulk-report/retrieve",
    "bulk_report/retrieve",
    "bulkreport/retrieve",
    "bulk-report/get",
    "bulk_report/get",
    "bulkreport/get",
];
