// Suggestion application: field path resolution, atomic replace, undo history.

pub mod handlers;
pub mod ledger;
pub mod path;
