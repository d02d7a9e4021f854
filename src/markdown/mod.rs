//! Parsing of the lightly marked-up text produced by the content generator

pub mod inline;
pub mod line;
pub mod structure;

pub use inline::strip_inline;
pub use line::{classify, Line};
pub use structure::{MarkdownStructureParser, StructuredRow, StructuredTable};
