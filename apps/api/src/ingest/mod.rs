// CV upload intake: file text extraction and input validation.

pub mod extract;
pub mod handlers;
pub mod validation;
