//! Card storage: an in-memory table and a JSON-lines file backed by it.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::Card;

/// Error reading or writing a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed row at line {line}: {source}")]
    MalformedRow {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot encode row {rowid}: {source}")]
    Encode {
        rowid: u64,
        #[source]
        source: serde_json::Error,
    },
}

/// Destination for finalized cards.
pub trait CardSink {
    /// Store one card and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the backing storage fails.
    fn insert(&mut self, card: &Card) -> Result<u64, StoreError>;
}

impl CardSink for Vec<Card> {
    fn insert(&mut self, card: &Card) -> Result<u64, StoreError> {
        self.push(card.clone());
        Ok(self.len() as u64)
    }
}

/// A card as held by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCard {
    pub rowid: u64,
    #[serde(flatten)]
    pub card: Card,
    /// Set by the cleanup pass on a row that was followed by a later
    /// snapshot of the same listing, changed or not.
    #[serde(default)]
    pub clean: bool,
}

/// Outcome of [`MemoryStore::clean`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub examined: usize,
    pub removed: usize,
    pub marked: usize,
}

/// Rows kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    rows: Vec<StoredCard>,
    next_rowid: u64,
}

fn by_listing_then_time(a: &Card, b: &Card) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.set_name.cmp(&b.set_name))
        .then_with(|| a.timestamp.cmp(&b.timestamp))
}

impl MemoryStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_rowid: 1,
        }
    }

    /// Build a store from existing rows; new row ids continue after the
    /// highest one.
    #[must_use]
    pub fn from_rows(rows: Vec<StoredCard>) -> Self {
        let next_rowid = rows.iter().map(|r| r.rowid).max().unwrap_or(0) + 1;
        Self { rows, next_rowid }
    }

    #[must_use]
    pub fn rows(&self) -> &[StoredCard] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Collapse repeated snapshots of the same card.
    ///
    /// Rows are visited ordered by name, set and timestamp. When a row lists
    /// the same card as the last surviving row, it is deleted if prices and
    /// stock are unchanged. Either way the surviving row is marked clean.
    pub fn clean(&mut self) -> CleanSummary {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| by_listing_then_time(&self.rows[a].card, &self.rows[b].card));

        let mut summary = CleanSummary {
            examined: order.len(),
            ..CleanSummary::default()
        };
        let mut remove = vec![false; self.rows.len()];

        let mut order = order.into_iter();
        let Some(mut last) = order.next() else {
            return summary;
        };

        for i in order {
            let (prev, card) = (&self.rows[last].card, &self.rows[i].card);
            if !card.same_listing(prev) {
                last = i;
                continue;
            }

            let duplicate = card.same_details(prev);
            if !self.rows[last].clean {
                self.rows[last].clean = true;
                summary.marked += 1;
            }
            if duplicate {
                remove[i] = true;
                summary.removed += 1;
            } else {
                last = i;
            }
        }

        let mut flags = remove.into_iter();
        self.rows.retain(|_| !flags.next().unwrap_or(false));

        debug!(
            examined = summary.examined,
            removed = summary.removed,
            marked = summary.marked,
            "clean"
        );
        summary
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CardSink for MemoryStore {
    fn insert(&mut self, card: &Card) -> Result<u64, StoreError> {
        let rowid = self.next_rowid;
        self.next_rowid += 1;
        self.rows.push(StoredCard {
            rowid,
            card: card.clone(),
            clean: false,
        });
        debug!(rowid, name = %card.name, set = %card.set_name, "insert");
        Ok(rowid)
    }
}

/// A [`MemoryStore`] loaded from and saved to a file holding one JSON
/// object per row.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    table: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the file cannot be read or a row does not
    /// parse.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let rows = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .map_err(|source| StoreError::MalformedRow { line: i + 1, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(path = %path.display(), rows = rows.len(), "open store");

        Ok(Self {
            path,
            table: MemoryStore::from_rows(rows),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn rows(&self) -> &[StoredCard] {
        self.table.rows()
    }

    pub fn clean(&mut self) -> CleanSummary {
        self.table.clean()
    }

    /// Write every row back to the file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` when the file cannot be written.
    pub fn save(&self) -> Result<(), StoreError> {
        let mut out = String::new();
        for row in self.table.rows() {
            let line = serde_json::to_string(row).map_err(|source| StoreError::Encode {
                rowid: row.rowid,
                source,
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        fs::write(&self.path, out).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl CardSink for FileStore {
    fn insert(&mut self, card: &Card) -> Result<u64, StoreError> {
        self.table.insert(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, buy: i64, ts: &str) -> Card {
        Card {
            name: name.to_string(),
            set_name: "ALP".to_string(),
            buy_price: buy,
            sell_price: buy * 2,
            stock: 1,
            timestamp: ts.to_string(),
        }
    }

    #[test]
    fn row_ids_increase() {
        let mut store = MemoryStore::new();
        assert_eq!(store.insert(&card("A", 1, "t1")).expect("insert"), 1);
        assert_eq!(store.insert(&card("B", 1, "t1")).expect("insert"), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn clean_drops_repeats_and_keeps_changes() {
        let mut store = MemoryStore::new();
        for c in [
            card("A", 1, "t1"),
            card("B", 5, "t1"),
            card("A", 1, "t2"),
            card("A", 2, "t3"),
            card("A", 2, "t4"),
        ] {
            store.insert(&c).expect("insert");
        }

        let summary = store.clean();
        assert_eq!(summary.examined, 5);
        assert_eq!(summary.removed, 2);
        assert_eq!(summary.marked, 2);

        let left: Vec<_> = store
            .rows()
            .iter()
            .map(|r| (r.card.name.as_str(), r.card.timestamp.as_str(), r.clean))
            .collect();
        assert_eq!(
            left,
            vec![("A", "t1", true), ("B", "t1", false), ("A", "t3", true)]
        );
    }

    #[test]
    fn changed_snapshot_still_marks_earlier_row() {
        let mut store = MemoryStore::new();
        store.insert(&card("A", 1, "t1")).expect("insert");
        store.insert(&card("A", 2, "t2")).expect("insert");

        let summary = store.clean();
        assert_eq!(summary.removed, 0);
        assert_eq!(summary.marked, 1);
        let flags: Vec<_> = store.rows().iter().map(|r| r.clean).collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn clean_on_empty_store() {
        assert_eq!(MemoryStore::new().clean(), CleanSummary::default());
    }

    #[test]
    fn row_json_round_trip() {
        let row = StoredCard {
            rowid: 7,
            card: card("Æther\tVial \"Foil\"", 1500, "2014-01-02 03:04:05 +0000 UTC"),
            clean: true,
        };
        let line = serde_json::to_string(&row).expect("encode");
        assert!(!line.contains('\n'));
        let parsed: StoredCard = serde_json::from_str(&line).expect("decode");
        assert_eq!(parsed, row);
    }

    #[test]
    fn row_is_flat() {
        let row = StoredCard {
            rowid: 1,
            card: card("A", 1, "t1"),
            clean: false,
        };
        let value = serde_json::to_value(&row).expect("encode");
        assert_eq!(value["name"], "A");
        assert_eq!(value["buy_price"], 1);
        assert_eq!(value["rowid"], 1);
    }
}
