//! Core types for the cache synchronization agent.

/// Fingerprint: opaque content-version token for a single resource path
pub type Fingerprint = String;

/// LogicalPath: origin-relative resource path; the entry document is "/"
pub type LogicalPath = String;
