//! # Fablecraft Lorebook
//!
//! Pure, synchronous lorebook operations: building a tag index, matching
//! entries against free text, and merging the three inheritance tiers
//! (global / series / story) into one entry collection.
//!
//! Nothing here does I/O; callers hand in entry snapshots and get values
//! back.

pub mod matcher;
pub mod merger;

pub use matcher::{build_index, match_in_text, normalize};
pub use merger::merge_for_story;
