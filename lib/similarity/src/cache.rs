// Bounded concurrent cache of pair scores keyed by interned vocabulary indices
use moka::sync::Cache;

/// Unordered pair of vocabulary indices
pub type PairKey = (u32, u32);

/// Shared by every rayon worker of a matrix fill
pub type ScoreCache = Cache<PairKey, f64>;

#[inline]
pub fn pair_key(a: u32, b: u32) -> PairKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[must_use]
pub fn score_cache(capacity: usize) -> ScoreCache {
    Cache::builder().max_capacity(capacity as u64).build()
}
