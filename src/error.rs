//! Typed errors for the failures callers are expected to tell apart. Store
//! plumbing still propagates through `anyhow` with context attached.

use thiserror::Error;

/// Input rejected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a title")]
    TitleRequired,
}

/// Control actions the synchronizer refuses to perform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("At least one language must stay visible")]
    LastVisibleLanguage,
}

/// Problems addressing the realtime store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid realtime path '{0}'")]
    InvalidPath(String),
}
