//! Archive handling for DOCX files
//!
//! DOCX files are ZIP archives containing XML parts and media. The whole
//! archive is unpacked into memory when it is opened, so nothing downstream
//! blocks on I/O.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use zip::read::ZipArchive;

use crate::error::{OoxmlError, Result};

/// Read access to the named parts of a package
pub trait PartContainer {
    /// Bytes of the part at `uri` (package-relative, no leading slash)
    fn get_part(&self, uri: &str) -> Option<&[u8]>;

    /// Like [`get_part`](Self::get_part) but a missing part is an error
    fn require_part(&self, uri: &str) -> Result<&[u8]> {
        self.get_part(uri)
            .ok_or_else(|| OoxmlError::MissingFile(uri.to_string()))
    }
}

/// Represents an unpacked OOXML package
#[derive(Debug, Default, Clone)]
pub struct OoxmlArchive {
    /// All files in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Open and unpack a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Build an archive from bytes already in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(std::io::Cursor::new(bytes))
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files
            .get(path.trim_start_matches('/'))
            .map(|v| v.as_slice())
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// List all files in the archive
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    /// Set or update a file's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }
}

impl PartContainer for OoxmlArchive {
    fn get_part(&self, uri: &str) -> Option<&[u8]> {
        self.get(uri)
    }
}
