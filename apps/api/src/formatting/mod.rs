// Pure text renderers: raw CV text to inline-styled HTML, StructuredCV to Markdown.
// Nothing in here performs I/O or returns an error.

pub mod escape;
pub mod handlers;
pub mod markdown;
pub mod text_html;
