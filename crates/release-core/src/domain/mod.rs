//! Domain model for release decisions.

pub mod error;
pub mod options;
pub mod outcome;
pub mod template;

pub use error::{ReleaseError, Result};
pub use options::{OptionInputs, RunOptions, Trigger, VersionSpec};
pub use outcome::{AssetUpload, Outcome, UploadReport, UploadStatus};
pub use template::{VersionTemplate, WILDCARD};
