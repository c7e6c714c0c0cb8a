use crate::types::{ArtistKey, Bucket, ListeningEvent, TrackKey};

/// How much a single listen contributes to its key's count.
pub trait Weigh {
    fn weight(&self, event: &ListeningEvent) -> f64;
}

/// Every listen counts once.
///
/// It is unknown whether the provider weights listens at all (by time
/// played, skips, shuffle...), so this is the only built-in strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeight;

impl Weigh for UniformWeight {
    fn weight(&self, _event: &ListeningEvent) -> f64 {
        1.0
    }
}

impl<F> Weigh for F
where
    F: Fn(&ListeningEvent) -> f64,
{
    fn weight(&self, event: &ListeningEvent) -> f64 {
        self(event)
    }
}

/// Accumulate weighted counts and play time per key. Events for which
/// `key_of` returns `None` are skipped.
pub fn aggregate_by<'a, K, I, F>(events: I, weigher: &dyn Weigh, key_of: F) -> Bucket<K>
where
    K: Ord,
    I: IntoIterator<Item = &'a ListeningEvent>,
    F: Fn(&ListeningEvent) -> Option<K>,
{
    let mut bucket = Bucket::new();

    for event in events {
        let Some(key) = key_of(event) else {
            continue;
        };

        let weight = weigher.weight(event);
        let tally = bucket.entry(key).or_default();
        if weight.is_finite() && weight > 0.0 {
            tally.count += weight;
        }
        tally.ms_played = tally.ms_played.saturating_add(event.ms_played);
    }

    bucket
}

pub fn aggregate_artists<'a, I>(events: I, weigher: &dyn Weigh) -> Bucket<ArtistKey>
where
    I: IntoIterator<Item = &'a ListeningEvent>,
{
    aggregate_by(events, weigher, |e| Some(ArtistKey(e.artist_name.clone())))
}

/// Events without a title cannot be keyed and are left out.
pub fn aggregate_tracks<'a, I>(events: I, weigher: &dyn Weigh) -> Bucket<TrackKey>
where
    I: IntoIterator<Item = &'a ListeningEvent>,
{
    aggregate_by(events, weigher, |e| {
        e.track_name.as_ref().map(|title| TrackKey {
            title: title.clone(),
            artist: e.artist_name.clone(),
        })
    })
}

/// Total milliseconds played.
pub fn total_time_played<'a, I>(events: I) -> u64
where
    I: IntoIterator<Item = &'a ListeningEvent>,
{
    events
        .into_iter()
        .fold(0u64, |total, e| total.saturating_add(e.ms_played))
}
