use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::aggregate::{
    UniformWeight, Weigh, aggregate_artists, aggregate_tracks, total_time_played,
};
use crate::debug_log;
use crate::filter::RecordFilter;
use crate::rank::{ms_to_minutes, top_k};
use crate::types::{ListKind, ListeningEvent, Report, Summary};

/// What to compute over a loaded history.
#[derive(Debug, Clone)]
pub struct RecapRequest {
    /// Years to report on. `None` derives them from the data.
    pub years: Option<Vec<String>>,
    pub top_k: usize,
    /// One summary over the whole history instead of one per year.
    pub cumulative: bool,
}

/// A top list that came back longer than requested because of ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieExpansion {
    /// `None` for the cumulative summary.
    pub year: Option<String>,
    pub list: ListKind,
    pub requested: usize,
    pub found: usize,
}

impl fmt::Display for TieExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(year) = &self.year {
            write!(f, "{year}: ")?;
        }
        write!(
            f,
            "There was a tie found, so instead of having {} {}, found {}.",
            self.requested,
            self.list.noun(),
            self.found
        )
    }
}

#[derive(Debug, Clone)]
pub struct Recap {
    pub report: Report,
    pub ties: Vec<TieExpansion>,
    /// First and last year present in the history, for cumulative runs.
    pub span: Option<(String, String)>,
}

pub struct Recapper {
    filter: RecordFilter,
    weigher: Box<dyn Weigh>,
}

impl Default for Recapper {
    fn default() -> Self {
        Self::new(RecordFilter::default())
    }
}

impl Recapper {
    pub fn new(filter: RecordFilter) -> Self {
        Self {
            filter,
            weigher: Box::new(UniformWeight),
        }
    }

    #[allow(dead_code)]
    pub fn with_weigher(mut self, weigher: impl Weigh + 'static) -> Self {
        self.weigher = Box::new(weigher);
        self
    }

    pub fn run(&self, events: &[ListeningEvent], request: &RecapRequest) -> Recap {
        let listens: Vec<&ListeningEvent> =
            events.iter().filter(|e| self.filter.is_listen(e)).collect();
        if debug_log::is_enabled() {
            debug_log::log(
                "RECAP",
                "PREFILTER",
                &format!("{} of {} events are listens", listens.len(), events.len()),
            );
        }

        let mut ties = Vec::new();

        if request.cumulative {
            let span = derive_years(listens.iter().copied());
            let span = span.first().cloned().zip(span.last().cloned());
            let summary = self.summarize(&listens, request.top_k, None, &mut ties);
            return Recap {
                report: Report::Cumulative(summary),
                ties,
                span,
            };
        }

        let years = match &request.years {
            Some(years) => normalize_years(years),
            None => derive_years(listens.iter().copied()),
        };

        let mut by_year = BTreeMap::new();
        for year in years {
            // The per-year check repeats the listen check, so the full
            // history can be filtered directly.
            let partition = self.filter.filter(events, &year);
            if debug_log::is_enabled() {
                debug_log::log(
                    "RECAP",
                    "PARTITION",
                    &format!("{year}: {} listens", partition.len()),
                );
            }

            let summary =
                self.summarize(&partition, request.top_k, Some(year.as_str()), &mut ties);
            by_year.insert(year, summary);
        }

        Recap {
            report: Report::PerYear(by_year),
            ties,
            span: None,
        }
    }

    fn summarize(
        &self,
        events: &[&ListeningEvent],
        k: usize,
        year: Option<&str>,
        ties: &mut Vec<TieExpansion>,
    ) -> Summary {
        let tracks = aggregate_tracks(events.iter().copied(), self.weigher.as_ref());
        let artists = aggregate_artists(events.iter().copied(), self.weigher.as_ref());

        let summary = Summary {
            top_tracks: top_k(&tracks, k),
            top_artists: top_k(&artists, k),
            // Rounded once over the whole partition.
            total_minutes: ms_to_minutes(total_time_played(events.iter().copied())),
        };

        for (list, found) in [
            (ListKind::Tracks, summary.top_tracks.len()),
            (ListKind::Artists, summary.top_artists.len()),
        ] {
            if found > k {
                ties.push(TieExpansion {
                    year: year.map(String::from),
                    list,
                    requested: k,
                    found,
                });
            }
        }

        summary
    }
}

/// Distinct `YYYY` prefixes present in the events, ascending.
pub fn derive_years<'a, I>(events: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ListeningEvent>,
{
    events
        .into_iter()
        .filter_map(|e| e.year())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn normalize_years(years: &[String]) -> Vec<String> {
    years
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests;
