use std::fs;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One speech as captured from a detail page, before any import cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSpeech {
    pub name: String,
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
}

/// One speech file from the secondary corpus.
#[derive(Debug, Deserialize)]
pub struct CorpusSpeech {
    pub date: String,
    pub text: String,
    pub title: String,
}

// ── Export rows ──
// Field declaration order is CSV column order; the csv writer emits a
// header row from the field names.

#[derive(Debug, Serialize)]
pub struct SpeakerRow {
    pub speaker_id: u32,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TermRow {
    pub term_id: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SpeakerTermRow {
    pub speaker_speaker_id: u32,
    pub terms_term_id: u32,
}

#[derive(Debug, Serialize)]
pub struct DocumentRow {
    pub document_id: u32,
    pub delivery_date: String,
    pub full_text: String,
    pub title: String,
    pub speaker_speaker_id: u32,
}

#[derive(Debug, Serialize)]
pub struct SpeakerDocumentRow {
    pub speaker_speaker_id: u32,
    pub documents_document_id: u32,
}

/// The five in-memory tables of one batch run. Build-once, read-only;
/// rows stay in insertion order.
#[derive(Debug)]
pub struct ExportTables {
    pub speakers: Vec<SpeakerRow>,
    pub terms: Vec<TermRow>,
    pub speaker_terms: Vec<SpeakerTermRow>,
    pub documents: Vec<DocumentRow>,
    pub speaker_documents: Vec<SpeakerDocumentRow>,
}

impl ExportTables {
    /// Write all five tables under `dir`, one CSV file per table.
    pub fn write_csv(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        write_table(&dir.join("speaker.csv"), &self.speakers)?;
        write_table(&dir.join("term.csv"), &self.terms)?;
        write_table(&dir.join("speaker_terms.csv"), &self.speaker_terms)?;
        write_table(&dir.join("document.csv"), &self.documents)?;
        write_table(&dir.join("speaker_documents.csv"), &self.speaker_documents)?;
        Ok(())
    }
}

/// Serialize rows to a CSV file, header row included.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_table_to(BufWriter::new(file), rows)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Serialize rows as CSV into any writer. Quoting follows standard CSV
/// rules (embedded separators, quotes, and newlines get escaped).
pub fn write_table_to<T: Serialize, W: io::Write>(w: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
