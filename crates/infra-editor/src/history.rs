//! Linear undo/redo history.
//!
//! Every recorded state is a full snapshot of nodes and edges, cloned
//! structurally, so entries never alias the live collections. An entry
//! recorded by a hand edit of the code also keeps that text. A cursor marks
//! the entry that matches the live state. Recording drops everything after
//! the cursor (the redo tail) before appending.

use infra_core::GraphSnapshot;

/// One recorded state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryEntry {
    pub snapshot: GraphSnapshot,
    /// User text shown instead of the generated code, if any.
    pub code_override: Option<String>,
}

impl HistoryEntry {
    pub fn new(snapshot: GraphSnapshot, code_override: Option<String>) -> Self {
        Self {
            snapshot,
            code_override,
        }
    }
}

/// Ordered entries plus a cursor. Invariant: `cursor < entries.len()`.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    /// Maximum number of entries kept; `None` keeps everything.
    limit: Option<usize>,
}

impl HistoryLog {
    /// A log holding one entry: the empty graph.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: vec![HistoryEntry::default()],
            cursor: 0,
            limit: limit.map(|l| l.max(1)),
        }
    }

    /// Truncate the redo tail, append `entry`, and move the cursor onto it.
    /// When over the limit, the oldest entries are dropped.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        if let Some(limit) = self.limit
            && self.entries.len() > limit
        {
            let excess = self.entries.len() - limit;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry. `None` (and no change) at the first entry.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry. `None` (and no change) at the last entry.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the log always holds at least the initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infra_core::{NetworkConfig, ResourceNode};

    fn snap(names: &[&str]) -> HistoryEntry {
        let nodes = names
            .iter()
            .map(|n| ResourceNode::network(n, NetworkConfig::new(*n, "10.0.0.0/16")))
            .collect();
        HistoryEntry::new(GraphSnapshot::new(nodes, vec![]), None)
    }

    #[test]
    fn starts_with_empty_graph_at_cursor_zero() {
        let log = HistoryLog::default();
        assert_eq!(log.len(), 1);
        assert_eq!(log.cursor(), 0);
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn record_advances_cursor() {
        let mut log = HistoryLog::default();
        log.record(snap(&["a"]));
        log.record(snap(&["a", "b"]));
        assert_eq!(log.len(), 3);
        assert_eq!(log.cursor(), 2);
        assert_eq!(log.undo(), Some(&snap(&["a"])));
    }

    #[test]
    fn undo_floor_and_redo_ceiling() {
        let mut log = HistoryLog::default();
        log.record(snap(&["a"]));

        assert_eq!(log.redo(), None);
        assert_eq!(log.cursor(), 1);

        assert_eq!(log.undo(), Some(&HistoryEntry::default()));
        assert_eq!(log.undo(), None);
        assert_eq!(log.cursor(), 0);

        assert_eq!(log.redo(), Some(&snap(&["a"])));
        assert_eq!(log.cursor(), 1);
    }

    #[test]
    fn recording_discards_redo_tail() {
        let mut log = HistoryLog::default();
        log.record(snap(&["a"]));
        log.record(snap(&["a", "b"]));
        log.undo();
        log.undo();
        log.record(snap(&["c"]));

        assert_eq!(log.len(), 2);
        assert_eq!(log.cursor(), 1);
        assert!(!log.can_redo());
        assert_eq!(log.undo(), Some(&HistoryEntry::default()));
        assert_eq!(log.redo(), Some(&snap(&["c"])));
    }

    #[test]
    fn limit_trims_oldest() {
        let mut log = HistoryLog::new(Some(3));
        for name in ["a", "b", "c", "d", "e"] {
            log.record(snap(&[name]));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.cursor(), 2);

        let mut oldest = None;
        let mut undo_count = 0;
        while let Some(entry) = log.undo() {
            oldest = Some(entry.clone());
            undo_count += 1;
        }
        assert_eq!(undo_count, 2);
        assert_eq!(oldest, Some(snap(&["c"])));
    }

    #[test]
    fn zero_limit_keeps_one_entry() {
        let mut log = HistoryLog::new(Some(0));
        log.record(snap(&["a"]));
        assert_eq!(log.len(), 1);
        assert_eq!(log.cursor(), 0);
        assert!(!log.can_undo());
    }

    #[test]
    fn override_text_travels_with_its_entry() {
        let mut log = HistoryLog::default();
        log.record(snap(&["a"]));
        let edited = HistoryEntry::new(snap(&["a"]).snapshot, Some("# edited".into()));
        log.record(edited.clone());

        assert_eq!(log.undo().and_then(|e| e.code_override.clone()), None);
        assert_eq!(log.redo(), Some(&edited));
    }
}
