// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only collection file
//!
//! One record per line, each carrying a CRC32 of its document. Lines that
//! fail to parse or verify (a torn write) are skipped on replay.

use lodge_core::Document;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in collection file operations
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    checksum: u32,
    doc: Document,
}

impl Record {
    fn new(doc: Document) -> Result<Self, serde_json::Error> {
        let checksum = checksum(&doc)?;
        Ok(Self { checksum, doc })
    }

    fn verify(&self) -> bool {
        checksum(&self.doc).is_ok_and(|c| c == self.checksum)
    }
}

fn checksum(doc: &Document) -> Result<u32, serde_json::Error> {
    let json = serde_json::to_string(doc)?;
    Ok(crc32fast::hash(json.as_bytes()))
}

/// A collection stored as a JSON-lines file
#[derive(Debug, Clone)]
pub struct CollectionFile {
    path: PathBuf,
}

impl CollectionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append documents and sync them to disk
    pub fn append(&self, docs: &[Document]) -> Result<(), CollectionError> {
        if docs.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for doc in docs {
            buf.push_str(&serde_json::to_string(&Record::new(doc.clone())?)?);
            buf.push('\n');
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        // Start on a fresh line if a previous write was torn
        if !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
        }
        file.write_all(buf.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Read back every intact document, in append order
    pub fn replay(&self) -> Result<Vec<Document>, CollectionError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut docs = Vec::new();
        let mut skipped = 0usize;

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Record>(&line) {
                Ok(record) if record.verify() => docs.push(record.doc),
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                skipped,
                "skipped corrupt records"
            );
        }
        Ok(docs)
    }
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
