use crate::cutoff::CutoffTable;
use crate::types::ListeningEvent;

/// Minimum playback, in milliseconds, for an event to count as a listen.
pub const LISTENING_THRESHOLD_MS: u64 = 25_000;

/// Decides which events count toward a year's recap.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    pub cutoffs: CutoffTable,
    pub listening_threshold_ms: u64,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            cutoffs: CutoffTable::default(),
            listening_threshold_ms: LISTENING_THRESHOLD_MS,
        }
    }
}

impl RecordFilter {
    pub fn new(cutoffs: CutoffTable, listening_threshold_ms: u64) -> Self {
        Self {
            cutoffs,
            listening_threshold_ms,
        }
    }

    /// Whether the event's timestamp starts with `year`. Events without a
    /// timestamp belong to no year.
    pub fn is_correct_year(&self, event: &ListeningEvent, year: &str) -> bool {
        event.year().is_some_and(|y| y == year)
    }

    /// Whether the event happened strictly before its own year's cutoff.
    pub fn is_before_cutoff(&self, event: &ListeningEvent) -> bool {
        match (event.year(), event.month_day()) {
            (Some(year), Some(month_day)) => month_day < self.cutoffs.boundary_for(year).as_str(),
            _ => false,
        }
    }

    /// Title present and played long enough to be a genuine listen.
    pub fn is_listen(&self, event: &ListeningEvent) -> bool {
        event.track_name.is_some() && event.ms_played >= self.listening_threshold_ms
    }

    pub fn is_valid(&self, event: &ListeningEvent, year: &str) -> bool {
        // The cutoff only applies to events from the requested year.
        self.is_correct_year(event, year) && self.is_before_cutoff(event) && self.is_listen(event)
    }

    /// Events valid for `year`, in their original order.
    pub fn filter<'a>(&self, events: &'a [ListeningEvent], year: &str) -> Vec<&'a ListeningEvent> {
        events.iter().filter(|e| self.is_valid(e, year)).collect()
    }
}
