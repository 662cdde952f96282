use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::normalize::clean_for_import;
use crate::tables::{self, CorpusSpeech, DocumentRow, SpeakerDocumentRow};

/// Fixed speaker assignment for the two corpus subtrees, plus the first
/// document ID to hand out. The offset lets these rows concatenate with
/// a primary export downstream without colliding.
pub struct CorpusConfig {
    pub trump_speaker_id: u32,
    pub clinton_speaker_id: u32,
    pub start_document_id: u32,
}

pub struct CorpusTables {
    pub documents: Vec<DocumentRow>,
    pub speaker_documents: Vec<SpeakerDocumentRow>,
    pub errors: usize,
}

impl CorpusTables {
    pub fn write_csv(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        tables::write_table(&dir.join("document.csv"), &self.documents)?;
        tables::write_table(&dir.join("speaker_documents.csv"), &self.speaker_documents)?;
        Ok(())
    }
}

/// Walk `<root>/{trump,clinton}/<subdir>/*.json` and build document rows.
///
/// Files that fail to read or parse are logged and skipped; their
/// document is simply absent and no ID is consumed. Entries are visited
/// in sorted name order so IDs come out deterministic.
pub fn ingest(root: &Path, cfg: &CorpusConfig) -> Result<CorpusTables> {
    let mut documents = Vec::new();
    let mut speaker_documents = Vec::new();
    let mut errors = 0usize;
    let mut next_document_id = cfg.start_document_id;

    let sources = [
        ("trump", cfg.trump_speaker_id),
        ("clinton", cfg.clinton_speaker_id),
    ];

    for (name, speaker_id) in sources {
        let source = root.join(name);
        for dir in sorted_entries(&source)?.into_iter().filter(|p| p.is_dir()) {
            for file in sorted_entries(&dir)?.into_iter().filter(|p| p.is_file()) {
                match read_speech(&file) {
                    Ok(speech) => {
                        let document_id = next_document_id;
                        next_document_id += 1;
                        documents.push(DocumentRow {
                            document_id,
                            delivery_date: speech.date,
                            full_text: clean_for_import(&speech.text),
                            // Titles in this corpus are already plain.
                            title: speech.title,
                            speaker_speaker_id: speaker_id,
                        });
                        speaker_documents.push(SpeakerDocumentRow {
                            speaker_speaker_id: speaker_id,
                            documents_document_id: document_id,
                        });
                    }
                    Err(e) => {
                        errors += 1;
                        warn!("skipping {}: {:#}", file.display(), e);
                    }
                }
            }
        }
    }

    info!("Corpus ingest: {} documents, {} errors", documents.len(), errors);
    Ok(CorpusTables { documents, speaker_documents, errors })
}

fn read_speech(path: &Path) -> Result<CorpusSpeech> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).context("invalid speech JSON")
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}

// ── Tests ──
