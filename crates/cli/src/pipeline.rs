use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tally_docx::{collect_uploads, DocxDocument, FileDescriptor};
use tally_parser::Table;
use tally_protocol::Data;
use tally_report::{Batch, Processor};

/// Read report inputs from disk. `early` paths are read after the regular
/// ones and carry the early filter flag.
pub fn read_inputs(paths: &[PathBuf], early: &[PathBuf]) -> Result<Vec<FileDescriptor>> {
    let regular = paths.iter().map(|path| (path, false));
    let flagged = early.iter().map(|path| (path, true));

    let mut uploads = Vec::with_capacity(paths.len() + early.len());
    for (path, filter_early) in regular.chain(flagged) {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        uploads.push(FileDescriptor::new(display_name(path), bytes, filter_early));
    }

    collect_uploads(uploads).context("failed to unpack archive")
}

/// Run one batch over documents in order. Documents that cannot be read are
/// listed in `Data::errors` instead of aborting the batch.
pub fn process_files(processor: &Processor, files: &[FileDescriptor]) -> Data {
    let mut batch = processor.batch();
    for file in files {
        add_file(&mut batch, file);
    }
    batch.finish()
}

fn add_file(batch: &mut Batch<'_>, file: &FileDescriptor) {
    log::debug!("reading {} ({} bytes)", file.name, file.size);

    if is_table_fixture(&file.name) {
        let parsed = std::str::from_utf8(&file.bytes)
            .map_err(|err| err.to_string())
            .and_then(|raw| Table::from_json_str(raw).map_err(|err| err.to_string()));
        match parsed {
            Ok(table) => batch.add_table(&file.name, file.filter_early, &table),
            Err(err) => batch.add_failure(&file.name, err),
        }
        return;
    }

    match DocxDocument::parse(&file.bytes) {
        Ok(document) => batch.add_table(&file.name, file.filter_early, &document),
        Err(err) => batch.add_failure(&file.name, err),
    }
}

/// Tables exported as JSON are accepted next to `.docx` documents
fn is_table_fixture(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".json")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
