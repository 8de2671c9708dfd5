//! The content-moderation side protocol: the word-list codec and classifier, and the aggregation
//! of per-validator vote extensions into an agreed word list.

pub mod quorum;
pub mod words;
