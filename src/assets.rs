//! Bounded, disk-backed cache for extracted page assets.
//!
//! The pipeline lifts embedded images out of pages faster than anyone
//! consumes them, so the store that holds them must be bounded — unbounded
//! disk growth is the failure this component exists to prevent. Capacity is
//! enforced by true-LRU eviction: `register` and `get` both move an entry to
//! the most-recently-used position, and eviction removes entries (and their
//! backing files, synchronously) from the least-recently-used end.
//!
//! ## Ordered index
//!
//! Recency is tracked by an explicit doubly linked list threaded through a
//! slab of nodes, with a hash map from asset id to slab slot. Move-to-front
//! and eviction-candidate lookup are both O(1), independent of cache size.
//!
//! ## Sharing
//!
//! One `AssetCache` is constructed at process start and passed to every call
//! site as `Arc<AssetCache>`. Its index and the check-size → evict → delete
//! step are not individually atomic, so a single mutex guards the whole
//! mutation, not just the map lookup — concurrent extractions from separate
//! tasks serialise here and nowhere else.

use crate::error::{AssetError, ExtractError};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// A resolvable cache entry, as returned by [`AssetCache::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Backing file on disk.
    pub path: PathBuf,
    pub content_type: String,
}

#[derive(Debug, Clone)]
struct AssetRecord {
    path: PathBuf,
    content_type: String,
}

// ── Recency index ────────────────────────────────────────────────────────

struct Node {
    id: String,
    record: AssetRecord,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Hash index plus doubly linked recency list over a slab.
///
/// `head` is the most-recently-used end, `tail` the eviction candidate.
/// Slots on the free list hold stale nodes that are never linked; membership
/// is decided by `map` alone.
struct LruIndex {
    map: HashMap<String, usize>,
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl LruIndex {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn slot_of(&self, id: &str) -> Option<usize> {
        self.map.get(id).copied()
    }

    fn record(&self, slot: usize) -> &AssetRecord {
        &self.nodes[slot].record
    }

    /// Detach a linked slot from the recency list.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[slot].prev = None;
        self.nodes[slot].next = None;
    }

    /// Attach a detached slot at the most-recently-used end.
    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        self.nodes[slot].prev = None;
        self.nodes[slot].next = old_head;
        if let Some(h) = old_head {
            self.nodes[h].prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }

    /// Refresh a slot's recency.
    fn touch(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.push_front(slot);
    }

    /// Insert a new entry at the MRU end, or refresh an existing one in place.
    fn insert(&mut self, id: &str, record: AssetRecord) {
        if let Some(slot) = self.slot_of(id) {
            self.nodes[slot].record = record;
            self.touch(slot);
            return;
        }
        let node = Node {
            id: id.to_owned(),
            record,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.map.insert(id.to_owned(), slot);
        self.push_front(slot);
    }

    /// Remove and return the least-recently-used entry.
    fn pop_lru(&mut self) -> Option<(String, AssetRecord)> {
        let slot = self.tail?;
        self.unlink(slot);
        let id = self.nodes[slot].id.clone();
        let record = self.nodes[slot].record.clone();
        self.map.remove(&id);
        self.free.push(slot);
        Some((id, record))
    }
}

// ── Cache ────────────────────────────────────────────────────────────────

/// Bounded key-value store over byte payloads, backed by files on disk.
///
/// Construct one per process with [`AssetCache::new`] and share it as
/// `Arc<AssetCache>`; all methods take `&self` and serialise internally.
pub struct AssetCache {
    base_dir: PathBuf,
    max_items: usize,
    index: Mutex<LruIndex>,
}

impl AssetCache {
    /// Default maximum number of resident assets.
    pub const DEFAULT_MAX_ITEMS: usize = 200;

    /// Create a cache rooted at `base_dir`, holding at most `max_items`
    /// entries. The directory is created idempotently; an existing directory
    /// is reused as-is.
    pub fn new(base_dir: impl Into<PathBuf>, max_items: usize) -> Result<Self, ExtractError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|source| ExtractError::CacheDirFailed {
            path: base_dir.clone(),
            source,
        })?;
        debug!(
            "asset cache at {} (max {} items)",
            base_dir.display(),
            max_items
        );
        Ok(Self {
            base_dir,
            max_items: max_items.max(1),
            index: Mutex::new(LruIndex::new()),
        })
    }

    /// The conventional cache directory: `PAGELIFT_ASSET_DIR` if set,
    /// otherwise `pagelift_assets` under the system temp directory.
    pub fn default_dir() -> PathBuf {
        std::env::var_os("PAGELIFT_ASSET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("pagelift_assets"))
    }

    /// Directory holding the backing files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist `bytes` under `id` and record the entry at the
    /// most-recently-used position, then evict from the least-recently-used
    /// end while the cache exceeds its capacity.
    ///
    /// The backing file name is `{id}` when the id already ends in
    /// `.{extension}`, `{id}.{extension}` otherwise. Eviction deletes the
    /// evicted entry's backing file synchronously; deletion errors are
    /// logged and tolerated. Returns the backing file path.
    pub fn register(
        &self,
        id: &str,
        bytes: &[u8],
        extension: &str,
        content_type: &str,
    ) -> Result<PathBuf, AssetError> {
        let file_name = if Path::new(id)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            id.to_owned()
        } else {
            format!("{id}.{extension}")
        };
        let path = self.base_dir.join(file_name);
        fs::write(&path, bytes).map_err(|source| AssetError::WriteFailed {
            id: id.to_owned(),
            source,
        })?;

        // Index insertion and eviction happen under one lock so the bound
        // holds even with concurrent registrations.
        let mut index = self.index();
        index.insert(
            id,
            AssetRecord {
                path: path.clone(),
                content_type: content_type.to_owned(),
            },
        );
        while index.len() > self.max_items {
            let Some((evicted_id, record)) = index.pop_lru() else {
                break;
            };
            match fs::remove_file(&record.path) {
                Ok(()) => debug!("evicted asset '{}'", evicted_id),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(
                        "failed to delete evicted asset file '{}': {}",
                        record.path.display(),
                        err
                    );
                }
            }
        }

        Ok(path)
    }

    /// Look up an asset by id. A hit refreshes the entry's recency; a miss
    /// returns `None` without mutating the cache.
    pub fn get(&self, id: &str) -> Option<AssetEntry> {
        let mut index = self.index();
        let slot = index.slot_of(id)?;
        index.touch(slot);
        let record = index.record(slot);
        Some(AssetEntry {
            path: record.path.clone(),
            content_type: record.content_type.clone(),
        })
    }

    fn index(&self) -> MutexGuard<'_, LruIndex> {
        // A poisoned lock only means another thread panicked mid-mutation;
        // the index is still structurally usable.
        self.index.lock().unwrap_or_else(|e| e.into_inner())
    }
}
