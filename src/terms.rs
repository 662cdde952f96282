use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::tables::{SpeakerTermRow, TermRow};

/// End date assigned to the final term of the final group.
static TERMINAL_END_DATE: LazyLock<NaiveDate> =
    LazyLock::new(|| NaiveDate::from_ymd_opt(2021, 1, 20).unwrap());

/// One speaker's office terms as start dates. A speaker with
/// non-consecutive terms appears as multiple groups.
#[derive(Debug, Deserialize)]
pub struct TermGroup {
    pub name: String,
    pub start_dates: Vec<NaiveDate>,
}

/// Build one term per start date, term IDs sequential from 1.
///
/// Groups must already be in true chronological order; nothing is
/// re-sorted here. A term ends at the next start date within its group,
/// then at the next group's first start date, then at the terminal date.
/// Every group's name must resolve in `speaker_ids`.
pub fn build_terms(
    groups: &[TermGroup],
    speaker_ids: &HashMap<String, u32>,
) -> Result<(Vec<TermRow>, Vec<SpeakerTermRow>)> {
    let mut terms = Vec::new();
    let mut joins = Vec::new();
    let mut next_term_id = 1u32;

    for (i, group) in groups.iter().enumerate() {
        let Some(&speaker_id) = speaker_ids.get(&group.name) else {
            bail!("missing speaker id for term group: {}", group.name);
        };

        for (j, &start_date) in group.start_dates.iter().enumerate() {
            let end_date = match group.start_dates.get(j + 1) {
                Some(&next) => next,
                None => groups
                    .get(i + 1)
                    .and_then(|g| g.start_dates.first().copied())
                    .unwrap_or(*TERMINAL_END_DATE),
            };

            let term_id = next_term_id;
            next_term_id += 1;
            terms.push(TermRow { term_id, start_date, end_date });
            joins.push(SpeakerTermRow {
                speaker_speaker_id: speaker_id,
                terms_term_id: term_id,
            });
        }
    }

    Ok((terms, joins))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn group(name: &str, dates: &[&str]) -> TermGroup {
        TermGroup {
            name: name.to_string(),
            start_dates: dates.iter().map(|s| d(s)).collect(),
        }
    }

    fn ids(names: &[&str]) -> HashMap<String, u32> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), i as u32 + 1))
            .collect()
    }

    #[test]
    fn one_term_per_start_date() {
        let groups = vec![
            group("George Washington", &["1789-04-30", "1793-03-04"]),
            group("John Adams", &["1797-03-04"]),
        ];
        let (terms, joins) =
            build_terms(&groups, &ids(&["George Washington", "John Adams"])).unwrap();
        assert_eq!(terms.len(), 3);
        assert_eq!(joins.len(), 3);
        assert_eq!(terms.iter().map(|t| t.term_id).collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn end_dates_chain() {
        let groups = vec![
            group("George Washington", &["1789-04-30", "1793-03-04"]),
            group("John Adams", &["1797-03-04"]),
        ];
        let (terms, _) =
            build_terms(&groups, &ids(&["George Washington", "John Adams"])).unwrap();
        // Within a group: next start date of the same group.
        assert_eq!(terms[0].end_date, d("1793-03-04"));
        // Last term of a group: first start date of the next group.
        assert_eq!(terms[1].end_date, d("1797-03-04"));
        // Last term overall: fixed terminal date.
        assert_eq!(terms[2].end_date, d("2021-01-20"));
    }

    #[test]
    fn every_end_follows_its_start() {
        let groups = vec![
            group("Abraham Lincoln", &["1861-03-04", "1865-03-04"]),
            group("Andrew Johnson", &["1865-04-15"]),
        ];
        let (terms, _) =
            build_terms(&groups, &ids(&["Abraham Lincoln", "Andrew Johnson"])).unwrap();
        for t in &terms {
            assert!(t.end_date > t.start_date, "term {} not forward", t.term_id);
        }
    }

    #[test]
    fn joins_carry_the_group_speaker() {
        let groups = vec![
            group("Grover Cleveland", &["1885-03-04"]),
            group("Benjamin Harrison", &["1889-03-04"]),
            group("Grover Cleveland", &["1893-03-04"]),
        ];
        let (_, joins) =
            build_terms(&groups, &ids(&["Grover Cleveland", "Benjamin Harrison"])).unwrap();
        // Non-consecutive groups reuse the same speaker id.
        assert_eq!(
            joins.iter().map(|j| j.speaker_speaker_id).collect::<Vec<_>>(),
            [1, 2, 1]
        );
        assert_eq!(
            joins.iter().map(|j| j.terms_term_id).collect::<Vec<_>>(),
            [1, 2, 3]
        );
    }

    #[test]
    fn unknown_speaker_is_fatal() {
        let groups = vec![group("Millard Fillmore", &["1850-07-09"])];
        let err = build_terms(&groups, &ids(&["Zachary Taylor"])).unwrap_err();
        assert!(err.to_string().contains("Millard Fillmore"));
    }

    #[test]
    fn empty_groups_yield_nothing() {
        let (terms, joins) = build_terms(&[], &HashMap::new()).unwrap();
        assert!(terms.is_empty());
        assert!(joins.is_empty());
    }
}
