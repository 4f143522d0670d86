// In-memory analysis sessions. A session holds one StructuredCV from analysis
// until the user starts over; nothing is persisted.

pub mod handlers;
pub mod store;
