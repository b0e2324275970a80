//! Text search over buildings and rooms by space id, key, names and nicknames.
use std::cmp::Ordering;

use bevy::prelude::*;

use super::{store::CityDataset, types::CityObjectKind};

/// Attribute a search hit matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchField {
    SpaceId,
    Key,
    NameEn,
    NameNl,
    Nickname,
}

/// How closely a query matched, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    Exact,
    Prefix,
    WordPrefix,
    Substring,
    /// Every query character appears in order; the value counts the skipped characters.
    Scattered(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub key: String,
    pub kind: CityObjectKind,
    pub field: SearchField,
    pub quality: MatchQuality,
    /// Original text of the matched attribute.
    pub matched: String,
}

#[derive(Debug, Clone)]
struct SearchEntry {
    key: String,
    kind: CityObjectKind,
    terms: Vec<(SearchField, String, String)>,
}

/// Lowercased search terms of every building and room.
#[derive(Resource, Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    pub fn build(dataset: &CityDataset) -> Self {
        let mut entries: Vec<SearchEntry> = dataset
            .objects()
            .filter(|object| {
                matches!(
                    object.kind,
                    CityObjectKind::Building | CityObjectKind::BuildingRoom
                )
            })
            .map(|object| {
                let mut terms = Vec::new();
                let mut push = |field: SearchField, text: &str| {
                    let normalised = normalise(text);
                    if !normalised.is_empty() {
                        terms.push((field, text.to_string(), normalised));
                    }
                };
                if let Some(space_id) = object.space_id() {
                    push(SearchField::SpaceId, space_id);
                }
                push(SearchField::Key, &object.key);
                if let Some(name) = object.name_en() {
                    push(SearchField::NameEn, name);
                }
                if let Some(name) = object.name_nl() {
                    push(SearchField::NameNl, name);
                }
                for nickname in object.nicknames() {
                    push(SearchField::Nickname, &nickname);
                }
                SearchEntry {
                    key: object.key.clone(),
                    kind: object.kind.clone(),
                    terms,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `limit` objects matching `pattern`, one hit per object, best first.
    /// Ties prefer buildings, then the key order.
    pub fn search(&self, pattern: &str, limit: usize) -> Vec<SearchHit> {
        let query = normalise(pattern);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                entry
                    .terms
                    .iter()
                    .filter_map(|(field, original, term)| {
                        match_quality(&query, term).map(|quality| (quality, *field, original))
                    })
                    .min_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)))
                    .map(|(quality, field, original)| SearchHit {
                        key: entry.key.clone(),
                        kind: entry.kind.clone(),
                        field,
                        quality,
                        matched: original.clone(),
                    })
            })
            .collect();
        hits.sort_by(|a, b| {
            a.quality
                .cmp(&b.quality)
                .then_with(|| building_first(&a.kind, &b.kind))
                .then_with(|| a.key.cmp(&b.key))
        });
        hits.truncate(limit);
        hits
    }

    pub fn best(&self, pattern: &str) -> Option<SearchHit> {
        self.search(pattern, 1).into_iter().next()
    }
}

fn building_first(a: &CityObjectKind, b: &CityObjectKind) -> Ordering {
    let rank = |kind: &CityObjectKind| usize::from(*kind != CityObjectKind::Building);
    rank(a).cmp(&rank(b))
}

fn normalise(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn match_quality(query: &str, term: &str) -> Option<MatchQuality> {
    if term == query {
        return Some(MatchQuality::Exact);
    }
    if term.starts_with(query) {
        return Some(MatchQuality::Prefix);
    }
    if term
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.starts_with(query))
    {
        return Some(MatchQuality::WordPrefix);
    }
    if term.contains(query) {
        return Some(MatchQuality::Substring);
    }
    scattered_gaps(query, term).map(MatchQuality::Scattered)
}

/// Characters skipped between the first and last matched character, when all of
/// `query` occurs in order inside `term`.
fn scattered_gaps(query: &str, term: &str) -> Option<usize> {
    let mut wanted = query.chars().filter(|c| !c.is_whitespace()).peekable();
    let mut gaps = 0;
    let mut started = false;
    for c in term.chars() {
        let Some(&next) = wanted.peek() else {
            break;
        };
        if c == next {
            wanted.next();
            started = true;
        } else if started {
            gaps += 1;
        }
    }
    wanted.peek().is_none().then_some(gaps)
}
