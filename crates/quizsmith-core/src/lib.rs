//! Quiz-taking behavior over the authoring model: the matching
//! correspondence board, the sequential assessment session and the read-only
//! result projection.

pub mod error;
pub mod matching;
pub mod results;
pub mod session;
