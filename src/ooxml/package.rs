//! Zip package access for OOXML containers

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::PackageError;

/// An opened, read-only OOXML package
pub struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    pub fn open(bytes: &'a [u8]) -> Result<Self, PackageError> {
        Ok(Self {
            archive: ZipArchive::new(Cursor::new(bytes))?,
        })
    }

    /// Names of every part, in archive order
    pub fn part_names(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|index| self.archive.name_for_index(index))
            .map(str::to_string)
            .collect()
    }

    /// Read a part, or `None` if the package has no such part
    pub fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>, PackageError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(Some(buf))
    }

    /// Read a part that must exist
    pub fn require(&mut self, name: &str) -> Result<Vec<u8>, PackageError> {
        self.read(name)?
            .ok_or_else(|| PackageError::MissingPart(name.to_string()))
    }

    /// Serialize a copy of the package with `edits` replacing their parts
    ///
    /// Untouched parts are copied without recompression, keeping entry order.
    pub fn rewrite(mut self, edits: &BTreeMap<String, Vec<u8>>) -> Result<Vec<u8>, PackageError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for index in 0..self.archive.len() {
            let file = self.archive.by_index(index)?;
            match edits.get(file.name()) {
                Some(content) => {
                    let name = file.name().to_string();
                    drop(file);
                    writer.start_file(name, deflated())?;
                    writer.write_all(content)?;
                }
                None => writer.raw_copy_file(file)?,
            }
        }
        Ok(writer.finish()?.into_inner())
    }
}

/// Builds a new package from scratch
pub struct PackageWriter {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl Default for PackageWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageWriter {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    pub fn add(&mut self, name: &str, content: &[u8]) -> Result<(), PackageError> {
        self.writer.start_file(name, deflated())?;
        self.writer.write_all(content)?;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, PackageError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}
