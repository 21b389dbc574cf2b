use quizsmith_model::question::MatchingPair;

/// What a click did, so callers can re-render only what changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The clicked entry is now the pending selection on its side.
    Selected,
    /// The clicked entry was the pending selection and is no longer.
    Cleared,
    /// The definition values at rows `a` and `b` traded places and both
    /// selections were cleared.
    Swapped { a: usize, b: usize },
    /// The click landed outside the pair list.
    Ignored,
}

/// Selection state for a matching question. Pairing is positional: "matching"
/// a term to a definition relocates the definition value into the term's row,
/// the rendered columns themselves never reorder. Reset whenever the active
/// question changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchingBoard {
    term: Option<usize>,
    definition: Option<usize>,
}

/// Transposes the definition values of rows `a` and `b`, leaving the terms in
/// place. Self-inverse, and any sequence of these is a permutation of the
/// original definition values.
pub fn swap_definitions(pairs: &mut [MatchingPair], a: usize, b: usize) {
    if a == b || a >= pairs.len() || b >= pairs.len() {
        return;
    }
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    let (head, tail) = pairs.split_at_mut(high);
    std::mem::swap(&mut head[low].definition, &mut tail[0].definition);
}

impl MatchingBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn selected_term(&self) -> Option<usize> {
        self.term
    }

    #[must_use]
    pub fn selected_definition(&self) -> Option<usize> {
        self.definition
    }

    pub fn click_term(&mut self, index: usize, pairs: &mut [MatchingPair]) -> ClickOutcome {
        if index >= pairs.len() {
            return ClickOutcome::Ignored;
        }
        if self.term == Some(index) {
            self.term = None;
            return ClickOutcome::Cleared;
        }
        if let Some(other) = self.definition {
            swap_definitions(pairs, index, other);
            self.reset();
            return ClickOutcome::Swapped { a: index, b: other };
        }
        self.term = Some(index);
        ClickOutcome::Selected
    }

    pub fn click_definition(&mut self, index: usize, pairs: &mut [MatchingPair]) -> ClickOutcome {
        if index >= pairs.len() {
            return ClickOutcome::Ignored;
        }
        if self.definition == Some(index) {
            self.definition = None;
            return ClickOutcome::Cleared;
        }
        if let Some(other) = self.term {
            swap_definitions(pairs, other, index);
            self.reset();
            return ClickOutcome::Swapped { a: other, b: index };
        }
        self.definition = Some(index);
        ClickOutcome::Selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<MatchingPair> {
        vec![
            MatchingPair::new("one", "uno"),
            MatchingPair::new("two", "dos"),
            MatchingPair::new("three", "tres"),
        ]
    }

    fn definitions(pairs: &[MatchingPair]) -> Vec<&str> {
        pairs.iter().map(|pair| pair.definition.as_str()).collect()
    }

    #[test]
    fn clicking_the_same_entry_toggles_selection() {
        let mut board = MatchingBoard::new();
        let mut rows = pairs();
        assert_eq!(board.click_term(1, &mut rows), ClickOutcome::Selected);
        assert_eq!(board.selected_term(), Some(1));
        assert_eq!(board.click_term(1, &mut rows), ClickOutcome::Cleared);
        assert_eq!(board.selected_term(), None);
        // Same-side re-click just moves the selection.
        board.click_term(0, &mut rows);
        assert_eq!(board.click_term(2, &mut rows), ClickOutcome::Selected);
        assert_eq!(board.selected_term(), Some(2));
    }

    #[test]
    fn cross_side_click_swaps_definition_slots() {
        let mut board = MatchingBoard::new();
        let mut rows = pairs();
        board.click_term(0, &mut rows);
        assert_eq!(board.click_definition(2, &mut rows), ClickOutcome::Swapped { a: 0, b: 2 });
        assert_eq!(definitions(&rows), vec!["tres", "dos", "uno"]);
        // Terms never move.
        assert_eq!(rows[0].term, "one");
        assert_eq!(board, MatchingBoard::new());
    }

    #[test]
    fn swap_works_from_either_side() {
        let mut board = MatchingBoard::new();
        let mut rows = pairs();
        board.click_definition(1, &mut rows);
        assert_eq!(board.click_term(0, &mut rows), ClickOutcome::Swapped { a: 0, b: 1 });
        assert_eq!(definitions(&rows), vec!["dos", "uno", "tres"]);
    }

    #[test]
    fn swap_is_involutive() {
        let mut rows = pairs();
        let before = rows.clone();
        swap_definitions(&mut rows, 0, 2);
        swap_definitions(&mut rows, 0, 2);
        assert_eq!(rows, before);
    }

    #[test]
    fn any_click_sequence_permutes_the_definition_set() {
        let mut board = MatchingBoard::new();
        let mut rows = pairs();
        let mut expected: Vec<String> = rows.iter().map(|pair| pair.definition.clone()).collect();
        expected.sort();

        for (term, definition) in [(0, 1), (2, 0), (1, 1), (2, 2)] {
            board.click_term(term, &mut rows);
            board.click_definition(definition, &mut rows);
        }
        let mut actual: Vec<String> = rows.iter().map(|pair| pair.definition.clone()).collect();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn out_of_range_clicks_are_ignored() {
        let mut board = MatchingBoard::new();
        let mut rows = pairs();
        assert_eq!(board.click_term(7, &mut rows), ClickOutcome::Ignored);
        assert_eq!(board.click_definition(3, &mut rows), ClickOutcome::Ignored);
        assert_eq!(board, MatchingBoard::new());
    }
}
