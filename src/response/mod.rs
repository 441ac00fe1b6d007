//! Response aggregation
//!
//! The assistant answers with a sequence of partial frames. This module folds
//! them, in delivery order, into one [`MergedResponse`]:
//! - `audio` is concatenated
//! - `text` and `html` are joined with a single space
//! - `speech_recognition_results` are appended
//! - `action` maps are shallow-merged
//! - everything else keeps the latest value that was present

mod merger;

pub use merger::{FrameMerger, MergedResponse};
