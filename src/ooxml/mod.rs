//! Office Open XML containers (DOCX, XLSX)
//!
//! Both formats are zip packages of XML parts. Reading and editing go through
//! [`Package`] and [`XmlPart`]; every other part is copied through untouched.

pub mod docx;
pub mod package;
pub mod xlsx;
pub mod xml;

use thiserror::Error;

pub use package::{Package, PackageWriter};
pub use xml::{TextUnit, UnitSpec, XmlPart};

/// Failures inside an OOXML package
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("invalid zip container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML escape: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("required part {0} is missing")]
    MissingPart(String),

    /// Marker syntax the filler refuses to guess about
    #[error("{0}")]
    Template(String),
}
