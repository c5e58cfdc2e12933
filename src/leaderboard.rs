//! Score leaderboard
//!
//! Validated, rate-limited submission in front of a pluggable store. A
//! remote store is optional; when it is missing or fails, the local store
//! (LocalStorage on wasm32, memory natively) takes over. Every rejection
//! happens here and never reaches a store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Names are exactly this many letters
pub const NAME_LEN: usize = 3;
/// Scores are clamped to `[0, MAX_SCORE]`
pub const MAX_SCORE: u64 = 1_000_000;
/// Entries kept by the local store and fetched per query
pub const MAX_ENTRIES: usize = 200;
/// Minimum time between two submissions
pub const MIN_SUBMIT_INTERVAL_MS: u64 = 3000;
/// Submissions allowed per leaderboard instance
pub const MAX_SESSION_SUBMISSIONS: u32 = 5;
/// How long query results are reused
pub const CACHE_TTL_MS: u64 = 5000;

/// Rejected names (compared after normalization)
pub const DENYLIST: [&str; 22] = [
    "ASS", "BCH", "CNT", "CUM", "DCK", "DIK", "FAG", "FAP", "FCK", "FUC", "FUK", "JIZ", "KKK",
    "KYS", "NAZ", "NIG", "PNS", "SEX", "SHT", "TIT", "VGN", "XXX",
];

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub score: u64,
    /// Wall-clock ms when submitted
    pub timestamp_ms: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store data malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("name must be three letters and not blocked")]
    InvalidName,
    #[error("run {0} was already submitted")]
    AlreadySubmitted(u64),
    #[error("submitting too fast, retry in {retry_in_ms} ms")]
    TooSoon { retry_in_ms: u64 },
    #[error("submission limit reached for this session")]
    SessionLimit,
    #[error("no store accepted the score: {0}")]
    Store(#[from] StoreError),
}

impl SubmitError {
    /// Whether the same submission may succeed later
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::TooSoon { .. } | SubmitError::Store(_))
    }
}

/// Uppercase, strip non-letters, truncate; `None` unless exactly
/// `NAME_LEN` letters remain and the result is not denylisted.
pub fn normalize_name(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_uppercase())
        .take(NAME_LEN)
        .collect();
    if cleaned.len() != NAME_LEN || DENYLIST.contains(&cleaned.as_str()) {
        return None;
    }
    Some(cleaned)
}

/// Clamp a raw score into `[0, MAX_SCORE]`
pub fn normalize_score(raw: i64) -> u64 {
    raw.clamp(0, MAX_SCORE as i64) as u64
}

/// Drop invalid entries, sort by score descending, cap at `MAX_ENTRIES`
pub fn sanitize_entries(entries: Vec<Entry>) -> Vec<Entry> {
    let mut out: Vec<Entry> = entries
        .into_iter()
        .filter_map(|e| {
            Some(Entry {
                name: normalize_name(&e.name)?,
                score: e.score.min(MAX_SCORE),
                timestamp_ms: e.timestamp_ms,
            })
        })
        .collect();
    // Stable: equal scores keep submission order
    out.sort_by(|a, b| b.score.cmp(&a.score));
    out.truncate(MAX_ENTRIES);
    out
}

/// Backing storage for entries
pub trait LeaderboardStore {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn insert(&mut self, entry: Entry) -> Result<(), StoreError>;

    /// Entries sorted by score descending (at most `MAX_ENTRIES`)
    fn entries(&self) -> Result<Vec<Entry>, StoreError>;

    /// Total number of entries the store holds
    fn total(&self) -> Result<usize, StoreError> {
        Ok(self.entries()?.len())
    }

    /// Number of stored entries scoring strictly above `score`
    fn count_above(&self, score: u64) -> Result<usize, StoreError> {
        Ok(self.entries()?.iter().filter(|e| e.score > score).count())
    }
}

/// Store kept on this device
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalStore {
    entries: Vec<Entry>,
    #[cfg(test)]
    #[serde(skip)]
    fail_writes: bool,
}

impl LocalStore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tier_drop_rankings";

    pub fn new() -> Self {
        Self::default()
    }

    /// Load entries from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Vec<Entry>>(&json) {
                    Ok(raw) => {
                        let entries = sanitize_entries(raw);
                        log::info!("Loaded {} leaderboard entries", entries.len());
                        return Self {
                            entries,
                            ..Self::default()
                        };
                    }
                    Err(e) => log::warn!("Discarding malformed leaderboard data: {e}"),
                }
            }
        }

        log::info!("No leaderboard found, starting fresh");
        Self::new()
    }

    #[cfg(target_arch = "wasm32")]
    fn persist(&self) -> Result<(), StoreError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("LocalStorage missing".into()))?;
        let json = serde_json::to_string(&self.entries)?;
        storage
            .set_item(Self::STORAGE_KEY, &json)
            .map_err(|_| StoreError::Unavailable("LocalStorage write failed".into()))
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn persist(&self) -> Result<(), StoreError> {
        #[cfg(test)]
        if self.fail_writes {
            return Err(StoreError::Unavailable("write refused".into()));
        }
        Ok(())
    }
}

impl LeaderboardStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    /// The entry is kept in memory even when it cannot be written out
    fn insert(&mut self, entry: Entry) -> Result<(), StoreError> {
        let mut entries = std::mem::take(&mut self.entries);
        entries.push(entry);
        self.entries = sanitize_entries(entries);
        if let Err(e) = self.persist() {
            log::warn!("Leaderboard not saved, keeping it in memory: {e}");
        }
        Ok(())
    }

    fn entries(&self) -> Result<Vec<Entry>, StoreError> {
        Ok(self.entries.clone())
    }
}

/// Leaderboard front end
pub struct Leaderboard {
    remote: Option<Box<dyn LeaderboardStore>>,
    local: Box<dyn LeaderboardStore>,
    last_submit_ms: Option<u64>,
    submissions: u32,
    submitted_runs: HashSet<u64>,
    /// (fetched at, entries)
    cache: Option<(u64, Vec<Entry>)>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Leaderboard {
    /// Local-only leaderboard
    pub fn new() -> Self {
        Self::with_stores(None, Box::new(LocalStore::load()))
    }

    /// Remote store backed by the local one
    pub fn with_remote(remote: Box<dyn LeaderboardStore>) -> Self {
        Self::with_stores(Some(remote), Box::new(LocalStore::load()))
    }

    pub fn with_stores(
        remote: Option<Box<dyn LeaderboardStore>>,
        local: Box<dyn LeaderboardStore>,
    ) -> Self {
        Self {
            remote,
            local,
            last_submit_ms: None,
            submissions: 0,
            submitted_runs: HashSet::new(),
            cache: None,
        }
    }

    fn check_rate(&self, now_ms: u64) -> Result<(), SubmitError> {
        if self.submissions >= MAX_SESSION_SUBMISSIONS {
            return Err(SubmitError::SessionLimit);
        }
        if let Some(last) = self.last_submit_ms {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < MIN_SUBMIT_INTERVAL_MS {
                return Err(SubmitError::TooSoon {
                    retry_in_ms: MIN_SUBMIT_INTERVAL_MS - elapsed,
                });
            }
        }
        Ok(())
    }

    /// Submit the score of `run_id`. Returns the stored entry.
    pub fn submit(
        &mut self,
        name: &str,
        score: i64,
        run_id: u64,
        now_ms: u64,
    ) -> Result<Entry, SubmitError> {
        let Some(name) = normalize_name(name) else {
            log::warn!("Rejected leaderboard name {name:?}");
            return Err(SubmitError::InvalidName);
        };
        if self.submitted_runs.contains(&run_id) {
            return Err(SubmitError::AlreadySubmitted(run_id));
        }
        self.check_rate(now_ms)?;

        // Counts against the limit even if no store accepts it
        self.last_submit_ms = Some(now_ms);
        self.submissions += 1;

        let entry = Entry {
            name,
            score: normalize_score(score),
            timestamp_ms: now_ms,
        };

        let mut stored = false;
        if let Some(remote) = self.remote.as_mut() {
            match remote.insert(entry.clone()) {
                Ok(()) => stored = true,
                Err(e) => log::warn!("{} store failed, falling back to local: {e}", remote.name()),
            }
        }
        if !stored {
            self.local.insert(entry.clone())?;
        }

        self.submitted_runs.insert(run_id);
        self.cache = None;
        log::info!("Submitted {} with {} (run {})", entry.name, entry.score, run_id);
        Ok(entry)
    }

    /// All entries, served from cache while fresh
    fn all(&mut self, now_ms: u64) -> Vec<Entry> {
        if let Some((at, entries)) = &self.cache {
            if now_ms.saturating_sub(*at) < CACHE_TTL_MS {
                return entries.clone();
            }
        }

        let fetched = match self.remote.as_ref().map(|r| (r.name(), r.entries())) {
            Some((_, Ok(entries))) => entries,
            Some((name, Err(e))) => {
                log::warn!("{name} store query failed, using local: {e}");
                self.local_entries()
            }
            None => self.local_entries(),
        };
        let entries = sanitize_entries(fetched);
        self.cache = Some((now_ms, entries.clone()));
        entries
    }

    fn local_entries(&self) -> Vec<Entry> {
        self.local.entries().unwrap_or_else(|e| {
            log::warn!("local store query failed: {e}");
            Vec::new()
        })
    }

    /// Best `n` entries (`n` clamped to `1..=MAX_ENTRIES`)
    pub fn top_n(&mut self, n: usize, now_ms: u64) -> Vec<Entry> {
        let mut all = self.all(now_ms);
        all.truncate(n.clamp(1, MAX_ENTRIES));
        all
    }

    /// 1-based rank a score would take
    pub fn rank(&mut self, score: i64, now_ms: u64) -> usize {
        let score = normalize_score(score);
        let counted = match &self.remote {
            Some(remote) => remote.count_above(score),
            None => self.local.count_above(score),
        };
        match counted {
            Ok(above) => above + 1,
            Err(e) => {
                log::warn!("rank count failed, using cached entries: {e}");
                self.all(now_ms).iter().filter(|e| e.score > score).count() + 1
            }
        }
    }

    /// Number of recorded entries
    pub fn total(&mut self, now_ms: u64) -> usize {
        let remote_total = self.remote.as_ref().map(|r| r.total());
        match remote_total {
            Some(Ok(total)) => total,
            Some(Err(e)) => {
                log::warn!("remote total failed: {e}");
                self.all(now_ms).len()
            }
            None => self.all(now_ms).len(),
        }
    }

    /// "Top N%" figure for a score, in `1..=100`
    pub fn top_percent(&mut self, score: i64, now_ms: u64) -> u32 {
        let total = self.total(now_ms);
        if total <= 1 {
            return 1;
        }
        let rank = self.rank(score, now_ms);
        let pct = (rank as f64 / total as f64 * 100.0).ceil() as u32;
        pct.clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that always fails
    struct DownStore;

    impl LeaderboardStore for DownStore {
        fn name(&self) -> &'static str {
            "down"
        }
        fn insert(&mut self, _entry: Entry) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
        fn entries(&self) -> Result<Vec<Entry>, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    /// Remote store holding more entries than a single query returns
    struct BigStore {
        entries: Vec<Entry>,
    }

    impl BigStore {
        fn new(scores: std::ops::Range<u64>) -> Self {
            let entries = scores
                .map(|score| Entry {
                    name: "BIG".into(),
                    score,
                    timestamp_ms: score,
                })
                .collect();
            Self { entries }
        }
    }

    impl LeaderboardStore for BigStore {
        fn name(&self) -> &'static str {
            "big"
        }
        fn insert(&mut self, entry: Entry) -> Result<(), StoreError> {
            self.entries.push(entry);
            Ok(())
        }
        fn entries(&self) -> Result<Vec<Entry>, StoreError> {
            Ok(sanitize_entries(self.entries.clone()))
        }
        fn total(&self) -> Result<usize, StoreError> {
            Ok(self.entries.len())
        }
        fn count_above(&self, score: u64) -> Result<usize, StoreError> {
            Ok(self.entries.iter().filter(|e| e.score > score).count())
        }
    }

    fn board() -> Leaderboard {
        Leaderboard::with_stores(None, Box::new(LocalStore::new()))
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_name("abc").as_deref(), Some("ABC"));
        assert_eq!(normalize_name("a-b c").as_deref(), Some("ABC"));
        assert_eq!(normalize_name("abcdef").as_deref(), Some("ABC"));
        assert_eq!(normalize_name("a1!"), None);
        assert_eq!(normalize_name(""), None);
        assert_eq!(normalize_name("kkk"), None);
        assert_eq!(normalize_name("Sex"), None);
    }

    #[test]
    fn test_score_clamped() {
        assert_eq!(normalize_score(-5), 0);
        assert_eq!(normalize_score(1234), 1234);
        assert_eq!(normalize_score(5_000_000), MAX_SCORE);
    }

    #[test]
    fn test_submit_and_query() {
        let mut lb = board();
        lb.submit("abc", 100, 1, 0).expect("accepted");
        lb.submit("def", 300, 2, 3000).expect("accepted");
        lb.submit("ghi", 200, 3, 6000).expect("accepted");

        let top = lb.top_n(10, 6000);
        let names: Vec<_> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["DEF", "GHI", "ABC"]);
        assert_eq!(lb.top_n(0, 6000).len(), 1);

        assert_eq!(lb.rank(250, 6000), 2);
        assert_eq!(lb.rank(1000, 6000), 1);
        assert_eq!(lb.total(6000), 3);
        assert_eq!(lb.top_percent(300, 6000), 34);
        assert_eq!(lb.top_percent(50, 6000), 100);
    }

    #[test]
    fn test_invalid_name_never_stored() {
        let mut lb = board();
        assert!(matches!(lb.submit("a1!", 10, 1, 0), Err(SubmitError::InvalidName)));
        assert_eq!(lb.total(0), 0);
        // Rejection does not consume the rate limit
        assert!(lb.submit("abc", 10, 1, 0).is_ok());
    }

    #[test]
    fn test_rate_limits() {
        let mut lb = board();
        lb.submit("abc", 10, 1, 0).expect("accepted");
        let err = lb.submit("abc", 10, 2, 1000).expect_err("too soon");
        assert!(matches!(err, SubmitError::TooSoon { retry_in_ms: 2000 }));
        assert!(err.is_retryable());

        for run in 2..=5 {
            lb.submit("abc", 10, run, run * 3000).expect("accepted");
        }
        let err = lb.submit("abc", 10, 6, 60_000).expect_err("limit");
        assert!(matches!(err, SubmitError::SessionLimit));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_run_submitted_once() {
        let mut lb = board();
        lb.submit("abc", 10, 7, 0).expect("accepted");
        assert!(matches!(
            lb.submit("abc", 10, 7, 10_000),
            Err(SubmitError::AlreadySubmitted(7))
        ));
    }

    #[test]
    fn test_remote_failure_falls_back_to_local() {
        let mut lb = Leaderboard::with_stores(Some(Box::new(DownStore)), Box::new(LocalStore::new()));
        let entry = lb.submit("abc", 42, 1, 0).expect("local fallback");
        assert_eq!(entry.score, 42);
        assert_eq!(lb.top_n(5, 0), vec![entry]);
        assert_eq!(lb.total(0), 1);
        // Counting falls back to the cached local entries
        assert_eq!(lb.rank(10, 0), 2);
        assert_eq!(lb.rank(50, 0), 1);
    }

    #[test]
    fn test_rank_counts_past_query_cap() {
        let mut lb = Leaderboard::with_stores(
            Some(Box::new(BigStore::new(1000..1500))),
            Box::new(LocalStore::new()),
        );
        assert_eq!(lb.top_n(MAX_ENTRIES + 50, 0).len(), MAX_ENTRIES);
        assert_eq!(lb.total(0), 500);
        assert_eq!(lb.rank(1, 0), 501);
        assert_eq!(lb.rank(1250, 0), 250);
        assert_eq!(lb.rank(2000, 0), 1);
        assert_eq!(lb.top_percent(1, 0), 100);
        assert_eq!(lb.top_percent(1250, 0), 50);
    }

    #[test]
    fn test_unsaved_local_entry_is_not_duplicated() {
        let store = LocalStore {
            fail_writes: true,
            ..LocalStore::new()
        };
        let mut lb = Leaderboard::with_stores(None, Box::new(store));
        lb.submit("abc", 42, 1, 0).expect("kept in memory");

        // A retry of the same run is refused rather than stored twice
        assert!(matches!(
            lb.submit("abc", 42, 1, 3000),
            Err(SubmitError::AlreadySubmitted(1))
        ));
        assert_eq!(lb.top_n(10, 3000).len(), 1);
        assert_eq!(lb.total(3000), 1);
    }

    #[test]
    fn test_all_stores_down_is_retryable() {
        let mut lb = Leaderboard::with_stores(Some(Box::new(DownStore)), Box::new(DownStore));
        let err = lb.submit("abc", 42, 1, 0).expect_err("nowhere to store");
        assert!(matches!(err, SubmitError::Store(_)));
        assert!(err.is_retryable());
        // The run stays submittable
        assert!(lb.submit("abc", 42, 1, 3000).is_err_and(|e| matches!(e, SubmitError::Store(_))));
    }

    #[test]
    fn test_submit_invalidates_cache() {
        let mut local = LocalStore::new();
        local
            .insert(Entry {
                name: "ABC".into(),
                score: 5,
                timestamp_ms: 0,
            })
            .expect("insert");
        let mut lb = Leaderboard::with_stores(None, Box::new(local));
        assert_eq!(lb.top_n(10, 0).len(), 1);

        // A submit invalidates the cache immediately
        lb.submit("def", 9, 1, 100).expect("accepted");
        assert_eq!(lb.top_n(10, 200).len(), 2);
    }

    #[test]
    fn test_local_store_sorted_and_capped() {
        let mut store = LocalStore::new();
        for i in 0..(MAX_ENTRIES as u64 + 20) {
            store
                .insert(Entry {
                    name: "ABC".into(),
                    score: i,
                    timestamp_ms: i,
                })
                .expect("insert");
        }
        let entries = store.entries().expect("entries");
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].score, MAX_ENTRIES as u64 + 19);
        assert!(entries.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
