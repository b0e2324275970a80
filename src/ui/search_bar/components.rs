// src/ui/search_bar/components.rs
//
// Search box state and markers.

use std::time::Duration;

use bevy::input::keyboard::Key;
use bevy::prelude::*;

use crate::dataset::{SearchHit, SearchIndex};

/// What a key press did to the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEdit {
    Edited,
    Submitted,
    Closed,
    Ignored,
}

/// Text typed into the search box and the suggestions shown below it.
#[derive(Resource, Debug, Default)]
pub struct SearchQuery {
    text: String,
    focused: bool,
    /// Runs while the user is typing; suggestions refresh when it finishes.
    pending: Option<Timer>,
    results: Vec<SearchHit>,
}

impl SearchQuery {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    /// Waiting for a typing pause before refreshing suggestions.
    pub fn is_searching(&self) -> bool {
        self.pending.is_some()
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Drops focus and suggestions; the typed text stays.
    pub fn close(&mut self) {
        self.focused = false;
        self.pending = None;
        self.results.clear();
    }

    pub fn apply_key(&mut self, key: &Key, delay: Duration) -> SearchEdit {
        match key {
            Key::Character(chars) => {
                let before = self.text.len();
                self.text.extend(chars.chars().filter(|c| !c.is_control()));
                if self.text.len() == before {
                    return SearchEdit::Ignored;
                }
            }
            Key::Space => self.text.push(' '),
            Key::Backspace => {
                if self.text.pop().is_none() {
                    return SearchEdit::Ignored;
                }
            }
            Key::Enter => return SearchEdit::Submitted,
            Key::Escape => {
                self.close();
                return SearchEdit::Closed;
            }
            _ => return SearchEdit::Ignored,
        }

        if self.text.trim().is_empty() {
            self.pending = None;
            self.results.clear();
        } else {
            self.pending = Some(Timer::new(delay, TimerMode::Once));
        }
        SearchEdit::Edited
    }

    /// Advances the typing pause; returns true when the suggestions were recomputed.
    pub fn tick(&mut self, delta: Duration, index: &SearchIndex, limit: usize) -> bool {
        let Some(timer) = self.pending.as_mut() else {
            return false;
        };
        if !timer.tick(delta).is_finished() {
            return false;
        }
        self.pending = None;
        self.results = index.search(&self.text, limit);
        true
    }

    /// Key of the best match for the typed text. Closes the box when something matched.
    pub fn submit(&mut self, index: &SearchIndex) -> Option<String> {
        let hit = index.best(&self.text)?;
        self.close();
        Some(hit.key)
    }

    /// Picks one of the listed suggestions.
    pub fn choose(&mut self, key: &str) -> String {
        self.text = key.to_string();
        self.close();
        self.text.clone()
    }
}

/// Clickable box that takes keyboard focus.
#[derive(Component, Debug)]
pub struct SearchBox;

/// Text node mirroring the query.
#[derive(Component, Debug)]
pub struct SearchText;

/// Column holding the suggestion buttons.
#[derive(Component, Debug)]
pub struct SearchResults;

/// One suggestion.
#[derive(Component, Debug)]
pub struct SearchResultButton {
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::store::fixtures::campus;

    const DELAY: Duration = Duration::from_millis(250);

    fn type_text(query: &mut SearchQuery, text: &str) {
        for c in text.chars() {
            let key = if c == ' ' {
                Key::Space
            } else {
                Key::Character(c.to_string().into())
            };
            query.apply_key(&key, DELAY);
        }
    }

    #[test]
    fn suggestions_wait_for_a_typing_pause() {
        let index = SearchIndex::build(&campus());
        let mut query = SearchQuery::default();
        query.focus();
        type_text(&mut query, "30.02.00");

        assert!(!query.tick(Duration::from_millis(100), &index, 5));
        assert!(query.results().is_empty());
        assert!(query.tick(Duration::from_millis(200), &index, 5));
        let keys: Vec<&str> = query.results().iter().map(|hit| hit.key.as_str()).collect();
        assert_eq!(keys[..2], ["Room-A", "Room-B"]);
        assert!(!keys.contains(&"Room-D"));
        assert!(!query.tick(Duration::from_millis(300), &index, 5));
    }

    #[test]
    fn backspace_to_empty_clears_suggestions() {
        let index = SearchIndex::build(&campus());
        let mut query = SearchQuery::default();
        type_text(&mut query, "0");
        query.tick(DELAY, &index, 5);
        assert!(!query.results().is_empty());

        assert_eq!(query.apply_key(&Key::Backspace, DELAY), SearchEdit::Edited);
        assert!(query.results().is_empty());
        assert_eq!(query.apply_key(&Key::Backspace, DELAY), SearchEdit::Ignored);
        assert!(!query.tick(DELAY, &index, 5));
    }

    #[test]
    fn submit_picks_best_match_and_closes() {
        let index = SearchIndex::build(&campus());
        let mut query = SearchQuery::default();
        query.focus();
        type_text(&mut query, "02");

        assert_eq!(query.apply_key(&Key::Enter, DELAY), SearchEdit::Submitted);
        assert_eq!(query.submit(&index).as_deref(), Some("Building-02"));
        assert!(!query.is_focused());
        assert_eq!(query.text(), "02");
    }

    #[test]
    fn unmatched_submit_keeps_focus() {
        let index = SearchIndex::build(&campus());
        let mut query = SearchQuery::default();
        query.focus();
        type_text(&mut query, "zzz");
        assert_eq!(query.submit(&index), None);
        assert!(query.is_focused());
    }

    #[test]
    fn escape_closes_without_clearing_text() {
        let mut query = SearchQuery::default();
        query.focus();
        type_text(&mut query, "lib");
        assert_eq!(query.apply_key(&Key::Escape, DELAY), SearchEdit::Closed);
        assert!(!query.is_focused());
        assert_eq!(query.text(), "lib");
        assert_eq!(query.apply_key(&Key::ArrowLeft, DELAY), SearchEdit::Ignored);
    }
}
