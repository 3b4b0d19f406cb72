use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::LearnedWord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Learned,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryBreakdown {
    pub new: u64,
    pub learning: u64,
    pub consolidating: u64,
    pub mastered: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_words: u64,
    pub due_today: u64,
    pub current_streak: u32,
    pub mastery: MasteryBreakdown,
}

/// Bucket levels: 0 new, 1-2 learning, 3-4 consolidating, 5+ mastered.
pub fn mastery_breakdown(vocabulary: &[LearnedWord]) -> MasteryBreakdown {
    let mut stats = MasteryBreakdown::default();
    for word in vocabulary {
        match word.srs_level {
            0 => stats.new += 1,
            1..=2 => stats.learning += 1,
            3..=4 => stats.consolidating += 1,
            _ => stats.mastered += 1,
        }
    }
    stats
}

/// Consecutive `learned` days ending today or yesterday.
pub fn current_streak(log: &BTreeMap<NaiveDate, DayStatus>, today: NaiveDate) -> u32 {
    let mut learned = log
        .iter()
        .rev()
        .filter(|(_, status)| **status == DayStatus::Learned)
        .map(|(date, _)| *date);

    let Some(latest) = learned.next() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut previous = latest;
    for date in learned {
        if (previous - date).num_days() == 1 {
            streak += 1;
            previous = date;
        } else {
            break;
        }
    }
    streak
}

pub fn progress_stats(
    vocabulary: &[LearnedWord],
    log: &BTreeMap<NaiveDate, DayStatus>,
    today: NaiveDate,
) -> ProgressStats {
    ProgressStats {
        total_words: vocabulary.len() as u64,
        due_today: vocabulary.iter().filter(|w| w.is_due(today)).count() as u64,
        current_streak: current_streak(log, today),
        mastery: mastery_breakdown(vocabulary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Word;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn at_level(level: u8) -> LearnedWord {
        LearnedWord {
            word: Word {
                word: format!("w{level}"),
                meaning_bangla: "অর্থ".to_string(),
                synonyms: vec![],
                antonyms: vec![],
                examples: vec![],
                reference: None,
                is_ai_generated: None,
            },
            learned_on: day(1),
            srs_level: level,
            next_review: day(10),
        }
    }

    #[test]
    fn buckets_by_level() {
        let vocab: Vec<LearnedWord> = [0, 1, 2, 3, 4, 5, 6].into_iter().map(at_level).collect();
        let stats = mastery_breakdown(&vocab);
        assert_eq!(
            stats,
            MasteryBreakdown {
                new: 1,
                learning: 2,
                consolidating: 2,
                mastered: 2
            }
        );
    }

    #[test]
    fn streak_counts_back_from_yesterday() {
        let log = BTreeMap::from([
            (day(5), DayStatus::Learned),
            (day(7), DayStatus::Learned),
            (day(8), DayStatus::Learned),
            (day(9), DayStatus::Learned),
        ]);
        assert_eq!(current_streak(&log, day(10)), 3);
        assert_eq!(current_streak(&log, day(9)), 3);
        assert_eq!(current_streak(&log, day(11)), 0);
    }

    #[test]
    fn declined_day_breaks_streak() {
        let log = BTreeMap::from([
            (day(7), DayStatus::Learned),
            (day(8), DayStatus::Declined),
            (day(9), DayStatus::Learned),
        ]);
        assert_eq!(current_streak(&log, day(9)), 1);
        assert_eq!(current_streak(&BTreeMap::new(), day(9)), 0);
    }

    #[test]
    fn due_count_uses_today() {
        let vocab = vec![at_level(0), at_level(3)];
        let log = BTreeMap::new();
        assert_eq!(progress_stats(&vocab, &log, day(9)).due_today, 0);
        assert_eq!(progress_stats(&vocab, &log, day(10)).due_today, 2);
    }
}
