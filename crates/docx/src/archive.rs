use crate::error::Result;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// One uploaded document: name, size, raw bytes and its early-filter flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub bytes: Vec<u8>,
    pub filter_early: bool,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, filter_early: bool) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
            filter_early,
        }
    }

    /// Whether this upload is an archive of documents rather than a document
    #[must_use]
    pub fn is_archive(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".zip")
    }
}

/// Split a `.zip` upload into one descriptor per member file, in archive
/// order. Directories, macOS resource forks and Word lock files are skipped.
pub fn unpack_archive(bytes: &[u8], filter_early: bool) -> Result<Vec<FileDescriptor>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut files = Vec::with_capacity(archive.len());

    for idx in 0..archive.len() {
        let mut member = archive.by_index(idx)?;
        if member.is_dir() {
            continue;
        }

        let name = member.name().to_string();
        if is_noise(&name) {
            log::debug!("skipping archive member {name}");
            continue;
        }

        let mut data = Vec::with_capacity(usize::try_from(member.size()).unwrap_or(0));
        member.read_to_end(&mut data)?;
        files.push(FileDescriptor::new(name, data, filter_early));
    }

    Ok(files)
}

/// Replace every archive upload with its members; documents pass through.
pub fn collect_uploads(uploads: Vec<FileDescriptor>) -> Result<Vec<FileDescriptor>> {
    let mut files = Vec::new();
    for upload in uploads {
        if upload.is_archive() {
            files.extend(unpack_archive(&upload.bytes, upload.filter_early)?);
        } else {
            files.push(upload);
        }
    }
    Ok(files)
}

fn is_noise(name: &str) -> bool {
    let base = name.rsplit('/').next().unwrap_or(name);
    name.starts_with("__MACOSX/") || base.starts_with("~$") || base == ".DS_Store"
}
