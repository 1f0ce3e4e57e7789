//! Word (.docx) package I/O: a zip archive of XML parts

use crate::error::{Result, TailorError};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const DOCUMENT_PART: &str = "word/document.xml";

struct PackageEntry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// All parts of a package held in memory, in archive order
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    /// A missing template is a configuration error
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TailorError::Configuration(format!(
                "Resume template not found: {}",
                path.display()
            )));
        }
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().replace('\\', "/");
            let is_dir = entry.is_dir();
            let mut data = Vec::new();
            if !is_dir {
                entry.read_to_end(&mut data)?;
            }
            entries.push(PackageEntry { name, data, is_dir });
        }

        let package = Self { entries };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(TailorError::Document(format!("Package has no {}", DOCUMENT_PART)));
        }
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    pub fn document_xml(&self) -> Result<String> {
        let data = self
            .part(DOCUMENT_PART)
            .ok_or_else(|| TailorError::Document(format!("Package has no {}", DOCUMENT_PART)))?;
        String::from_utf8(data.to_vec())
            .map_err(|e| TailorError::Document(format!("{} is not UTF-8: {}", DOCUMENT_PART, e)))
    }

    pub fn set_document_xml(&mut self, xml: String) {
        match self.entries.iter_mut().find(|e| e.name == DOCUMENT_PART) {
            Some(entry) => entry.data = xml.into_bytes(),
            None => self.entries.push(PackageEntry {
                name: DOCUMENT_PART.to_string(),
                data: xml.into_bytes(),
                is_dir: false,
            }),
        }
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip_writer = ZipWriter::new(writer);
        let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for entry in &self.entries {
            if entry.is_dir {
                zip_writer.add_directory(entry.name.as_str(), opts)?;
            } else {
                zip_writer.start_file(entry.name.as_str(), opts)?;
                zip_writer.write_all(&entry.data)?;
            }
        }
        Ok(zip_writer.finish()?)
    }

    /// Write next to the destination first, then move into place
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        self.write_to(temp.as_file_mut())?;
        temp.persist(path).map_err(|e| TailorError::Io(e.error))?;
        Ok(())
    }
}
