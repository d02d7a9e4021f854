//! Templates: placeholder detection and filling
//!
//! Placeholders are found once, when a template is created, and cached on the
//! [`Template`] record. Filling consumes the cached set together with caller
//! data and produces a document of the same container type.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use docforge::template::{Template, TemplateFiller};
//!
//! let template = Template::text("Olá {{NOME}}!");
//! let data = BTreeMap::from([("NOME".to_string(), "Ana".to_string())]);
//! let filled = TemplateFiller::new().fill(&template, &data).unwrap();
//! assert_eq!(filled.bytes, "Olá Ana!".as_bytes());
//! ```

mod extractor;
mod filler;
mod model;
pub mod substitute;

pub use extractor::{visible_text, PlaceholderExtractor};
pub use filler::{filled_file_name, FillMode, TemplateFiller};
pub use model::{Template, TemplateSource};
