use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display order of a list, which decides where new ids land.
///
/// Timelines are `NewestFirst`: older pages are appended at the tail while
/// streamed records go to the head. `OldestFirst` lists (a chat log) are the
/// mirror image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListDirection {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl ListDirection {
    /// Placement of a page fetched through the `next` cursor.
    pub fn next_page(self) -> ListImport {
        match self {
            Self::NewestFirst => ListImport::Append,
            Self::OldestFirst => ListImport::Prepend,
        }
    }

    /// Placement of a page fetched through the `prev` cursor.
    pub fn previous_page(self) -> ListImport {
        match self {
            Self::NewestFirst => ListImport::Prepend,
            Self::OldestFirst => ListImport::Append,
        }
    }

    /// Placement of a record pushed by the streaming API.
    pub fn streamed(self) -> ListImport {
        self.previous_page()
    }
}

/// How a batch of ids is merged into a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListImport {
    /// Drop the current ids and use the batch.
    Replace,
    /// Add unseen ids at the tail.
    Append,
    /// Add unseen ids at the head, keeping the batch order.
    Prepend,
}

/// Pagination data parsed from a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub next: Option<String>,
    pub prev: Option<String>,
    pub total_count: Option<u64>,
}

/// A fetched page together with the cursor it was requested through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// First page: replaces ids and both cursors.
    First(PageInfo),
    /// Page behind `next`: only the `next` cursor moves.
    Next(PageInfo),
    /// Page behind `prev`: only the `prev` cursor moves.
    Previous(PageInfo),
}

/// Token captured when a fetch starts. A page applied with a token whose list
/// was removed, or whose store was reset, is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListToken {
    pub(crate) epoch: u64,
    pub(crate) generation: u64,
}

/// Pagination and loading metadata of a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListState {
    pub next: Option<String>,
    pub prev: Option<String>,
    pub total_count: Option<u64>,
    pub fetching: bool,
    pub fetched: bool,
    pub error: Option<String>,
    pub invalid: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub direction: ListDirection,
}

/// Ordered, duplicate-free sequence of entity ids.
#[derive(Debug, Clone)]
pub struct EntityList {
    ids: Vec<String>,
    seen: HashSet<String>,
    pub(crate) state: ListState,
    pub(crate) generation: u64,
}

impl EntityList {
    pub(crate) fn new(direction: ListDirection, generation: u64) -> Self {
        Self {
            ids: Vec::new(),
            seen: HashSet::new(),
            state: ListState {
                direction,
                ..ListState::default()
            },
            generation,
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Merge `ids` into the list. Ids already present keep their position.
    pub(crate) fn apply(&mut self, ids: Vec<String>, mode: ListImport) {
        match mode {
            ListImport::Replace => {
                self.ids.clear();
                self.seen.clear();
                self.push_unseen(ids);
            }
            ListImport::Append => self.push_unseen(ids),
            ListImport::Prepend => {
                let existing = std::mem::take(&mut self.ids);
                self.push_unseen(ids);
                self.ids.extend(existing);
            }
        }
    }

    fn push_unseen(&mut self, ids: Vec<String>) {
        for id in ids {
            if id.is_empty() || self.seen.contains(&id) {
                continue;
            }
            self.seen.insert(id.clone());
            self.ids.push(id);
        }
    }

    /// Remove the given ids, returning how many were present.
    pub(crate) fn remove(&mut self, ids: &HashSet<&str>) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| !ids.contains(id.as_str()));
        for id in ids {
            self.seen.remove(*id);
        }
        before - self.ids.len()
    }

    /// Update cursors for a page and return the merge mode it implies.
    pub(crate) fn apply_cursor(&mut self, page: PageCursor) -> ListImport {
        match page {
            PageCursor::First(info) => {
                self.state.next = info.next;
                self.state.prev = info.prev;
                self.state.total_count = info.total_count;
                ListImport::Replace
            }
            PageCursor::Next(info) => {
                self.state.next = info.next;
                if info.total_count.is_some() {
                    self.state.total_count = info.total_count;
                }
                self.state.direction.next_page()
            }
            PageCursor::Previous(info) => {
                self.state.prev = info.prev;
                if info.total_count.is_some() {
                    self.state.total_count = info.total_count;
                }
                self.state.direction.previous_page()
            }
        }
    }
}
