//! Statistics over accumulated mistakes
//!
//! Every view is recomputed from the full mistake list. Groups keep the order
//! in which their keys were first seen, and count-sorted views use a stable
//! sort so ties stay in that order.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path;

use chess_core::{PlayerInfo, PlayerResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::WorkerError;
use crate::mistake::Mistake;
use crate::storage;

const UNKNOWN_OPENING: &str = "Unknown";
const UNKNOWN_CATEGORY: &str = "unknown";

/// Ordered key/value pairs, serialized as a JSON object in this order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<K, V>(pub Vec<(K, V)>);

impl<K: PartialEq, V> Grouped<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Serialize, V: Serialize> Serialize for Grouped<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpeningStats {
    pub count: usize,
    pub avg_eval_drop: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceStats {
    pub count: usize,
    pub openings: Vec<String>,
    pub avg_eval_drop: f64,
}

/// The persisted statistics artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub total_mistakes: usize,
    pub by_opening: Grouped<String, OpeningStats>,
    pub by_sequence: Grouped<String, SequenceStats>,
    pub by_move_number: Grouped<u32, usize>,
    pub by_color: Grouped<String, usize>,
    pub by_time_class: Grouped<String, usize>,
}

pub fn summarize(mistakes: &[Mistake]) -> StatisticsSummary {
    StatisticsSummary {
        total_mistakes: mistakes.len(),
        by_opening: by_opening(mistakes),
        by_sequence: by_sequence(mistakes),
        by_move_number: by_move_number(mistakes),
        by_color: by_color(mistakes),
        by_time_class: by_time_class(mistakes),
    }
}

pub fn save_statistics(path: &Path, summary: &StatisticsSummary) -> Result<(), WorkerError> {
    storage::write_json_atomic(path, summary)
}

/// Group `items` by `key`, groups in first-seen order.
fn group_by<'a, K, F>(items: &'a [Mistake], key: F) -> Vec<(K, Vec<&'a Mistake>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Mistake) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&Mistake>)> = Vec::new();
    for item in items {
        let k = key(item);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![item]));
            }
        }
    }
    groups
}

fn mean_drop(mistakes: &[&Mistake]) -> f64 {
    if mistakes.is_empty() {
        return 0.0;
    }
    let total: i64 = mistakes.iter().map(|m| m.eval_drop as i64).sum();
    total as f64 / mistakes.len() as f64
}

fn opening_name(mistake: &Mistake) -> String {
    if mistake.opening.is_empty() {
        UNKNOWN_OPENING.to_string()
    } else {
        mistake.opening.clone()
    }
}

fn category(value: &str) -> String {
    if value.is_empty() {
        UNKNOWN_CATEGORY.to_string()
    } else {
        value.to_string()
    }
}

/// Count and mean drop per opening, most frequent first.
pub fn by_opening(mistakes: &[Mistake]) -> Grouped<String, OpeningStats> {
    let mut rows: Vec<(String, OpeningStats)> = group_by(mistakes, opening_name)
        .into_iter()
        .map(|(opening, group)| {
            let stats = OpeningStats {
                count: group.len(),
                avg_eval_drop: mean_drop(&group),
            };
            (opening, stats)
        })
        .collect();
    rows.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    Grouped(rows)
}

/// Count, distinct openings and mean drop per move sequence, most frequent first.
pub fn by_sequence(mistakes: &[Mistake]) -> Grouped<String, SequenceStats> {
    let mut rows: Vec<(String, SequenceStats)> = group_by(mistakes, Mistake::sequence_key)
        .into_iter()
        .map(|(sequence, group)| {
            let mut openings: Vec<String> = Vec::new();
            for mistake in &group {
                let name = opening_name(mistake);
                if !openings.contains(&name) {
                    openings.push(name);
                }
            }
            let stats = SequenceStats {
                count: group.len(),
                openings,
                avg_eval_drop: mean_drop(&group),
            };
            (sequence, stats)
        })
        .collect();
    rows.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    Grouped(rows)
}

/// Mistakes per full-move number, ascending.
pub fn by_move_number(mistakes: &[Mistake]) -> Grouped<u32, usize> {
    let mut rows: Vec<(u32, usize)> = group_by(mistakes, |m| m.move_number)
        .into_iter()
        .map(|(number, group)| (number, group.len()))
        .collect();
    rows.sort_by_key(|(number, _)| *number);
    Grouped(rows)
}

/// Mistakes per color, in first-seen order.
pub fn by_color(mistakes: &[Mistake]) -> Grouped<String, usize> {
    Grouped(
        group_by(mistakes, |m| m.player_color.as_str().to_string())
            .into_iter()
            .map(|(color, group)| (color, group.len()))
            .collect(),
    )
}

/// Mistakes per time class, most frequent first.
pub fn by_time_class(mistakes: &[Mistake]) -> Grouped<String, usize> {
    let mut rows: Vec<(String, usize)> = group_by(mistakes, |m| category(&m.time_class))
        .into_iter()
        .map(|(time_class, group)| (time_class, group.len()))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    Grouped(rows)
}

// ---------------------------------------------------------------------------
// Detailed views served over HTTP
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OpeningGroup {
    pub opening: String,
    pub count: usize,
    pub mistakes: Vec<Mistake>,
}

/// One occurrence of a mistake sequence.
#[derive(Debug, Clone, Serialize)]
pub struct SequenceGame {
    pub game_url: String,
    pub time_class: String,
    pub time_control: String,
    pub end_time: i64,
    pub eval_before: i32,
    pub eval_after: i32,
    pub eval_drop: i32,
    pub fen: String,
    pub move_sequence: Vec<String>,
    pub best_move: Option<String>,
    pub result: PlayerResult,
    pub white: PlayerInfo,
    pub black: PlayerInfo,
}

impl From<&Mistake> for SequenceGame {
    fn from(m: &Mistake) -> Self {
        Self {
            game_url: m.game_url.clone(),
            time_class: m.time_class.clone(),
            time_control: m.time_control.clone(),
            end_time: m.end_time,
            eval_before: m.eval_before,
            eval_after: m.eval_after,
            eval_drop: m.eval_drop,
            fen: m.fen.clone(),
            move_sequence: m.move_sequence.clone(),
            best_move: m.best_move.clone(),
            result: m.result,
            white: m.white.clone(),
            black: m.black.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceGroup {
    pub sequence: String,
    pub move_count: usize,
    /// Opening of the first occurrence
    pub opening: String,
    pub player_color: String,
    pub games: Vec<SequenceGame>,
    pub occurrences: usize,
    pub avg_eval_drop: f64,
}

/// Full mistakes grouped per opening, most frequent first.
pub fn opening_groups(mistakes: &[Mistake]) -> Vec<OpeningGroup> {
    let mut groups: Vec<OpeningGroup> = group_by(mistakes, opening_name)
        .into_iter()
        .map(|(opening, group)| OpeningGroup {
            opening,
            count: group.len(),
            mistakes: group.into_iter().cloned().collect(),
        })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

/// Every occurrence grouped per move sequence, most frequent first.
pub fn sequence_groups(mistakes: &[Mistake]) -> Vec<SequenceGroup> {
    let mut groups: Vec<SequenceGroup> = group_by(mistakes, Mistake::sequence_key)
        .into_iter()
        .map(|(sequence, group)| {
            let first = group[0];
            SequenceGroup {
                sequence,
                move_count: first.move_sequence.len(),
                opening: opening_name(first),
                player_color: first.player_color.as_str().to_string(),
                occurrences: group.len(),
                avg_eval_drop: mean_drop(&group),
                games: group.into_iter().map(SequenceGame::from).collect(),
            }
        })
        .collect();
    groups.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mistake::tests::sample_mistake;
    use chess_core::PlayerColor;

    fn fixture() -> Vec<Mistake> {
        let mut black = sample_mistake("Sicilian Defense", &["e4", "c5", "Nf3", "Qa5"], -200);
        black.player_color = PlayerColor::Black;
        black.time_class = "rapid".to_string();

        vec![
            sample_mistake("Italian Game", &["e4", "e5", "Nf3", "Nc6", "Ng5"], -100),
            black,
            sample_mistake("Italian Game", &["e4", "e5", "Nf3", "Nc6", "Ng5"], -300),
            sample_mistake("", &["d4", "d5", "Bf4", "c5", "Nc3"], -150),
            sample_mistake("Two Knights", &["e4", "e5", "Nf3", "Nc6", "Ng5"], -110),
        ]
    }

    #[test]
    fn test_by_opening_sorted_with_stable_ties() {
        let stats = by_opening(&fixture());
        let keys: Vec<&String> = stats.keys().collect();
        assert_eq!(
            keys,
            vec!["Italian Game", "Sicilian Defense", "Unknown", "Two Knights"]
        );
        let italian = stats.get(&"Italian Game".to_string()).unwrap();
        assert_eq!(italian.count, 2);
        assert!((italian.avg_eval_drop - -200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_by_sequence_collects_distinct_openings() {
        let stats = by_sequence(&fixture());
        let (key, top) = stats.iter().next().unwrap();
        assert_eq!(key, "e4 e5 Nf3 Nc6 Ng5");
        assert_eq!(top.count, 3);
        assert_eq!(top.openings, vec!["Italian Game", "Two Knights"]);
        assert!((top.avg_eval_drop - -170.0).abs() < 1e-9);
        assert_eq!(stats.len(), 3);
    }

    #[test]
    fn test_by_move_number_ascending() {
        let stats = by_move_number(&fixture());
        assert_eq!(stats.0, vec![(2, 1), (3, 4)]);
    }

    #[test]
    fn test_by_color_and_time_class() {
        let mistakes = fixture();
        assert_eq!(
            by_color(&mistakes).0,
            vec![("white".to_string(), 4), ("black".to_string(), 1)]
        );
        assert_eq!(
            by_time_class(&mistakes).0,
            vec![("blitz".to_string(), 4), ("rapid".to_string(), 1)]
        );
    }

    #[test]
    fn test_summary_serializes_in_sorted_order() {
        let summary = summarize(&fixture());
        let json = serde_json::to_string(&summary).unwrap();
        let italian = json.find("\"Italian Game\"").unwrap();
        let two_knights = json.find("\"Two Knights\"").unwrap();
        assert!(italian < two_knights);
        assert!(json.contains("\"by_move_number\":{\"2\":1,\"3\":4}"));
        assert!(!json.contains("\"mistakes\""));
        assert_eq!(summary.total_mistakes, 5);
    }

    #[test]
    fn test_summary_is_deterministic() {
        let mistakes = fixture();
        assert_eq!(summarize(&mistakes), summarize(&mistakes));
    }

    #[test]
    fn test_empty_input() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_mistakes, 0);
        assert!(summary.by_opening.is_empty());
        assert!(sequence_groups(&[]).is_empty());
    }

    #[test]
    fn test_sequence_groups_detail() {
        let groups = sequence_groups(&fixture());
        assert_eq!(groups[0].sequence, "e4 e5 Nf3 Nc6 Ng5");
        assert_eq!(groups[0].occurrences, 3);
        assert_eq!(groups[0].move_count, 5);
        assert_eq!(groups[0].opening, "Italian Game");
        assert_eq!(groups[0].games.len(), 3);
        assert_eq!(groups[0].games[1].eval_drop, -300);
    }

    #[test]
    fn test_opening_groups_keep_full_mistakes() {
        let groups = opening_groups(&fixture());
        assert_eq!(groups[0].opening, "Italian Game");
        assert_eq!(groups[0].mistakes.len(), 2);
        assert_eq!(groups[2].opening, "Unknown");
    }
}
