use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::normalize::clean_for_import;
use crate::tables::{
    DocumentRow, ExportTables, RawSpeech, SpeakerDocumentRow, SpeakerRow,
};
use crate::terms::{self, TermGroup};

/// Documents whose cleaned text exceeds this are dropped whole, never
/// truncated.
pub const MAX_DOCUMENT_CHARS: usize = 100_000;

/// Speeches scraped without a speaker name that can still be attributed,
/// keyed by title.
const NAME_REPAIRS: &[(&str, &str)] =
    &[("Address to Congress on the American Jobs Act", "Barack Obama")];

/// Speakers that never appear in the scraped corpus but are needed by
/// the term data.
const INJECTED_SPEAKERS: &[&str] = &["Donald Trump"];

pub struct ExportCounts {
    pub speakers: usize,
    pub terms: usize,
    pub documents: usize,
    pub skipped: usize,
}

impl ExportCounts {
    pub fn print(&self) {
        println!(
            "Saved {} speakers, {} terms, {} documents ({} oversized skipped).",
            self.speakers, self.terms, self.documents, self.skipped
        );
    }
}

/// Full export pass: load inputs, build the five tables, write the CSVs.
pub fn run(speeches_path: &Path, terms_path: &Path, out_dir: &Path) -> Result<ExportCounts> {
    let speeches = load_speeches(speeches_path)?;
    let groups = load_term_groups(terms_path)?;
    let total_speeches = speeches.len();

    let tables = build_tables(speeches, &groups)?;
    tables.write_csv(out_dir)?;

    Ok(ExportCounts {
        speakers: tables.speakers.len(),
        terms: tables.terms.len(),
        documents: tables.documents.len(),
        skipped: total_speeches - tables.documents.len(),
    })
}

pub fn load_speeches(path: &Path) -> Result<Vec<RawSpeech>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read speeches {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid speeches JSON {}", path.display()))
}

pub fn load_term_groups(path: &Path) -> Result<Vec<TermGroup>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read terms {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid terms JSON {}", path.display()))
}

/// Build the five tables from the scraped speeches (listing order,
/// newest first) and the chronological term groups.
pub fn build_tables(mut speeches: Vec<RawSpeech>, groups: &[TermGroup]) -> Result<ExportTables> {
    // The listing is newest-first; IDs are assigned oldest-first.
    speeches.reverse();
    repair_names(&mut speeches);

    let (speakers, speaker_ids) = register_speakers(&speeches);
    let (terms, speaker_terms) = terms::build_terms(groups, &speaker_ids)?;
    let (documents, speaker_documents) = assemble_documents(&speeches, &speaker_ids)?;

    Ok(ExportTables {
        speakers,
        terms,
        speaker_terms,
        documents,
        speaker_documents,
    })
}

fn repair_names(speeches: &mut [RawSpeech]) {
    for speech in speeches {
        if !speech.name.is_empty() {
            continue;
        }
        if let Some((_, name)) = NAME_REPAIRS.iter().find(|(title, _)| *title == speech.title) {
            speech.name = name.to_string();
        }
    }
}

/// Distinct names in first-seen order get IDs from 1, followed by the
/// manually injected speakers.
fn register_speakers(speeches: &[RawSpeech]) -> (Vec<SpeakerRow>, HashMap<String, u32>) {
    let mut rows = Vec::new();
    let mut ids: HashMap<String, u32> = HashMap::new();
    let mut next_id = 1u32;

    for speech in speeches {
        if ids.contains_key(&speech.name) {
            continue;
        }
        ids.insert(speech.name.clone(), next_id);
        rows.push(SpeakerRow { speaker_id: next_id, name: speech.name.clone() });
        next_id += 1;
    }

    for &name in INJECTED_SPEAKERS {
        if ids.contains_key(name) {
            continue;
        }
        ids.insert(name.to_string(), next_id);
        rows.push(SpeakerRow { speaker_id: next_id, name: name.to_string() });
        next_id += 1;
    }

    (rows, ids)
}

/// One document per speech, in input order. An oversized document is
/// skipped but still consumes its ID, so exported IDs may have gaps.
fn assemble_documents(
    speeches: &[RawSpeech],
    speaker_ids: &HashMap<String, u32>,
) -> Result<(Vec<DocumentRow>, Vec<SpeakerDocumentRow>)> {
    let mut documents = Vec::with_capacity(speeches.len());
    let mut joins = Vec::with_capacity(speeches.len());
    let mut next_document_id = 1u32;

    for speech in speeches {
        let document_id = next_document_id;
        next_document_id += 1;

        let Some(&speaker_id) = speaker_ids.get(&speech.name) else {
            bail!(
                "missing speaker id for document {:?} ({:?})",
                speech.title,
                speech.name
            );
        };

        let full_text = clean_for_import(&speech.content);
        if full_text.len() > MAX_DOCUMENT_CHARS {
            warn!(
                "document {} has {} characters (> {}), skipping: {:?}",
                document_id,
                full_text.len(),
                MAX_DOCUMENT_CHARS,
                speech.title
            );
            continue;
        }

        documents.push(DocumentRow {
            document_id,
            delivery_date: speech.date.format("%Y-%m-%d").to_string(),
            full_text,
            title: clean_for_import(&speech.title),
            speaker_speaker_id: speaker_id,
        });
        joins.push(SpeakerDocumentRow {
            speaker_speaker_id: speaker_id,
            documents_document_id: document_id,
        });
    }

    Ok((documents, joins))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn speech(name: &str, date: &str, title: &str, content: &str) -> RawSpeech {
        RawSpeech {
            name: name.to_string(),
            date: date.parse().unwrap(),
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn speaker_ids_follow_chronological_order() {
        // Input is newest-first, as the listing delivers it.
        let speeches = vec![
            speech("John Adams", "1797-03-04", "Inaugural Address", "Later."),
            speech("George Washington", "1793-03-04", "Second Inaugural", "Again."),
            speech("George Washington", "1789-04-30", "First Inaugural", "First."),
        ];
        let tables = build_tables(speeches, &[]).unwrap();
        assert_eq!(tables.speakers[0].name, "George Washington");
        assert_eq!(tables.speakers[0].speaker_id, 1);
        assert_eq!(tables.speakers[1].name, "John Adams");
        assert_eq!(tables.speakers[1].speaker_id, 2);
        // Oldest speech gets document_id 1.
        assert_eq!(tables.documents[0].title, "First Inaugural");
        assert_eq!(tables.documents[0].document_id, 1);
    }

    #[test]
    fn injected_speaker_comes_last() {
        let speeches = vec![speech("Barack Obama", "2009-01-20", "Inaugural Address", "x")];
        let tables = build_tables(speeches, &[]).unwrap();
        let names: Vec<&str> = tables.speakers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Barack Obama", "Donald Trump"]);
        assert_eq!(tables.speakers[1].speaker_id, 2);
    }

    #[test]
    fn nameless_jobs_act_speech_is_obamas() {
        let speeches = vec![speech(
            "",
            "2011-09-08",
            "Address to Congress on the American Jobs Act",
            "Pass this jobs bill.",
        )];
        let tables = build_tables(speeches, &[]).unwrap();
        assert_eq!(tables.speakers[0].name, "Barack Obama");
        assert_eq!(tables.documents[0].speaker_speaker_id, 1);
    }

    #[test]
    fn oversized_document_skipped_and_id_burned() {
        // Newest-first input; after the reverse the big one is first.
        let speeches = vec![
            speech("A", "1801-01-01", "Short", &"b".repeat(100_000)),
            speech("A", "1800-01-01", "Long", &"a".repeat(100_001)),
        ];
        let tables = build_tables(speeches, &[]).unwrap();
        // Exactly 100,000 chars survives; 100,001 does not.
        assert_eq!(tables.documents.len(), 1);
        assert_eq!(tables.documents[0].title, "Short");
        // The skipped document consumed ID 1.
        assert_eq!(tables.documents[0].document_id, 2);
        assert_eq!(tables.speaker_documents.len(), 1);
        assert_eq!(tables.speaker_documents[0].documents_document_id, 2);
    }

    #[test]
    fn document_text_and_title_are_cleaned() {
        let speeches = vec![speech(
            "A",
            "1801-01-01",
            "The \u{201C}Annual\u{201D} Message",
            "We won. (Applause.) It\u{2019}s   done.",
        )];
        let tables = build_tables(speeches, &[]).unwrap();
        assert_eq!(tables.documents[0].full_text, "We won. It's done.");
        assert_eq!(tables.documents[0].title, "The Annual Message");
        assert_eq!(tables.documents[0].delivery_date, "1801-01-01");
    }

    #[test]
    fn term_group_with_unknown_speaker_aborts() {
        let speeches = vec![speech("A", "1801-01-01", "T", "c")];
        let groups = vec![TermGroup {
            name: "Nobody".to_string(),
            start_dates: vec!["1801-03-04".parse().unwrap()],
        }];
        assert!(build_tables(speeches, &groups).is_err());
    }

    #[test]
    fn terms_link_through_registered_speakers() {
        let speeches = vec![speech("George Washington", "1789-04-30", "First Inaugural", "x")];
        let groups = vec![TermGroup {
            name: "George Washington".to_string(),
            start_dates: vec!["1789-04-30".parse().unwrap(), "1793-03-04".parse().unwrap()],
        }];
        let tables = build_tables(speeches, &groups).unwrap();
        assert_eq!(tables.terms.len(), 2);
        assert_eq!(tables.speaker_terms.len(), 2);
        assert!(tables
            .speaker_terms
            .iter()
            .all(|j| j.speaker_speaker_id == 1));
    }
}
