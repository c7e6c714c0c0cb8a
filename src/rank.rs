use crate::types::{Bucket, RankKey, RankedEntry};

const MS_PER_MINUTE: u64 = 60_000;

/// Milliseconds to whole minutes, rounding half up.
pub fn ms_to_minutes(ms: u64) -> u64 {
    ms.saturating_add(MS_PER_MINUTE / 2) / MS_PER_MINUTE
}

/// Weighted counts are rounded half away from zero.
fn round_count(count: f64) -> u64 {
    count.round().max(0.0) as u64
}

/// The `k` highest-count keys, plus every key tied with the `k`-th.
///
/// Keys are ordered by raw weighted count, highest first; equal counts fall
/// back to key order so the result never depends on insertion order. The
/// tie check compares rounded counts, the same values that are reported.
pub fn top_k<K: RankKey>(bucket: &Bucket<K>, k: usize) -> Vec<RankedEntry> {
    if k == 0 {
        return Vec::new();
    }

    let mut sorted: Vec<_> = bucket.iter().collect();
    sorted.sort_by(|(ka, a), (kb, b)| b.count.total_cmp(&a.count).then_with(|| ka.cmp(kb)));

    let mut ranked: Vec<RankedEntry> = sorted
        .into_iter()
        .map(|(key, tally)| RankedEntry {
            name: key.display_name(),
            count: round_count(tally.count),
            minutes: ms_to_minutes(tally.ms_played),
        })
        .collect();

    if ranked.len() <= k {
        return ranked;
    }

    // Rounding preserves order, so entries tied with the k-th are adjacent.
    let last = ranked[k - 1].count;
    let ties = ranked[k..].iter().take_while(|e| e.count == last).count();
    ranked.truncate(k + ties);
    ranked
}
