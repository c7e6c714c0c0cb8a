use super::*;
use crate::cutoff::CutoffTable;
use crate::types::RankedEntry;

fn play(ts: &str, title: &str, artist: &str, ms_played: u64) -> ListeningEvent {
    ListeningEvent {
        ts: Some(ts.to_string()),
        track_name: Some(title.to_string()),
        artist_name: Some(artist.to_string()),
        ms_played,
        ..Default::default()
    }
}

fn per_year(recap: &Recap) -> &BTreeMap<String, Summary> {
    match &recap.report {
        Report::PerYear(by_year) => by_year,
        Report::Cumulative(_) => panic!("expected a per-year report"),
    }
}

fn cumulative(recap: &Recap) -> &Summary {
    match &recap.report {
        Report::Cumulative(summary) => summary,
        Report::PerYear(_) => panic!("expected a cumulative report"),
    }
}

/// An empty `years` slice asks for years derived from the data.
fn request(years: &[&str], top_k: usize, cumulative: bool) -> RecapRequest {
    RecapRequest {
        years: (!years.is_empty()).then(|| years.iter().map(|y| y.to_string()).collect()),
        top_k,
        cumulative,
    }
}

fn history() -> Vec<ListeningEvent> {
    vec![
        play("2023-02-01T08:00:00Z", "Heroes", "David Bowie", 180_000),
        play("2023-02-02T08:00:00Z", "Heroes", "David Bowie", 180_000),
        play("2023-03-01T08:00:00Z", "Hyperballad", "Björk", 240_000),
        // After 2023's 11-19 cutoff.
        play("2023-12-20T08:00:00Z", "Jóga", "Björk", 300_000),
        play("2024-01-05T08:00:00Z", "Hyperballad", "Björk", 240_000),
        play("2024-06-05T08:00:00Z", "Hyperballad", "Björk", 240_000),
        play("2024-07-05T08:00:00Z", "Life on Mars?", "David Bowie", 230_000),
        // Too short to be a listen.
        play("2024-07-06T08:00:00Z", "Starman", "David Bowie", 5_000),
    ]
}

#[test]
fn per_year_keys_derived_from_data() {
    let recap = Recapper::default().run(&history(), &request(&[], 5, false));
    let by_year = per_year(&recap);

    assert_eq!(by_year.keys().collect::<Vec<_>>(), ["2023", "2024"]);
    assert!(recap.span.is_none());
}

#[test]
fn per_year_summary_contents() {
    let recap = Recapper::default().run(&history(), &request(&[], 5, false));
    let by_year = per_year(&recap);

    let y2023 = &by_year["2023"];
    assert_eq!(
        y2023.top_tracks,
        vec![
            RankedEntry {
                name: Some("Heroes".into()),
                count: 2,
                minutes: 6,
            },
            RankedEntry {
                name: Some("Hyperballad".into()),
                count: 1,
                minutes: 4,
            },
        ]
    );
    assert_eq!(y2023.top_artists[0].name.as_deref(), Some("David Bowie"));
    // The December listen is past the cutoff.
    assert_eq!(y2023.total_minutes, 10);

    let y2024 = &by_year["2024"];
    assert_eq!(y2024.top_artists[0].name.as_deref(), Some("Björk"));
    assert_eq!(y2024.top_artists[0].count, 2);
    assert_eq!(y2024.top_artists[0].minutes, 8);
    assert_eq!(y2024.total_minutes, 12);
}

#[test]
fn late_listens_do_not_roll_forward() {
    let events = vec![
        play("2023-12-20T08:00:00Z", "Jóga", "Björk", 300_000),
        play("2024-01-05T08:00:00Z", "Heroes", "David Bowie", 180_000),
    ];
    let recap = Recapper::default().run(&events, &request(&["2024"], 5, false));
    let y2024 = &per_year(&recap)["2024"];

    assert_eq!(y2024.top_tracks.len(), 1);
    assert_eq!(y2024.top_tracks[0].name.as_deref(), Some("Heroes"));
}

#[test]
fn explicit_years_are_sorted_and_deduplicated() {
    let recap = Recapper::default().run(
        &history(),
        &request(&["2024", "2023", "2024"], 5, false),
    );
    assert_eq!(
        per_year(&recap).keys().collect::<Vec<_>>(),
        ["2023", "2024"]
    );
}

#[test]
fn requested_year_without_data_is_empty() {
    let recap = Recapper::default().run(&history(), &request(&["2019"], 5, false));
    let by_year = per_year(&recap);

    assert_eq!(by_year.len(), 1);
    assert_eq!(by_year["2019"], Summary::default());
    assert!(recap.ties.is_empty());
}

#[test]
fn empty_history() {
    let recap = Recapper::default().run(&[], &request(&[], 5, false));
    assert!(per_year(&recap).is_empty());

    let recap = Recapper::default().run(&[], &request(&[], 5, true));
    assert_eq!(cumulative(&recap), &Summary::default());
    assert!(recap.span.is_none());
}

#[test]
fn cumulative_spans_all_years_and_ignores_cutoff() {
    let recap = Recapper::default().run(&history(), &request(&[], 5, true));
    let summary = cumulative(&recap);

    assert_eq!(recap.span, Some(("2023".into(), "2024".into())));
    assert_eq!(summary.top_tracks[0].name.as_deref(), Some("Hyperballad"));
    assert_eq!(summary.top_tracks[0].count, 3);
    assert!(summary.top_tracks.iter().any(|e| e.name.as_deref() == Some("Jóga")));
    assert_eq!(summary.total_minutes, 27);
}

#[test]
fn cumulative_ignores_requested_years() {
    let all = Recapper::default().run(&history(), &request(&[], 5, true));
    let some = Recapper::default().run(&history(), &request(&["2023"], 5, true));
    assert_eq!(all.report, some.report);
}

#[test]
fn total_minutes_rounded_once() {
    // Each listen is 0.67 minutes: rounding per listen would give 3.
    let events = vec![
        play("2024-01-01T00:00:00Z", "a", "X", 40_000),
        play("2024-01-02T00:00:00Z", "b", "X", 40_000),
        play("2024-01-03T00:00:00Z", "c", "X", 40_000),
    ];

    let recap = Recapper::default().run(&events, &request(&[], 5, true));
    assert_eq!(cumulative(&recap).total_minutes, 2);

    let recap = Recapper::default().run(&events, &request(&[], 5, false));
    assert_eq!(per_year(&recap)["2024"].total_minutes, 2);
}

#[test]
fn events_without_timestamp_only_count_cumulatively() {
    let mut events = history();
    events.push(ListeningEvent {
        ts: None,
        track_name: Some("Orphan".into()),
        artist_name: None,
        ms_played: 60_000,
        ..Default::default()
    });

    let recap = Recapper::default().run(&events, &request(&[], 10, false));
    let by_year = per_year(&recap);
    assert_eq!(by_year.len(), 2);
    assert!(by_year.values().all(|s| {
        s.top_tracks
            .iter()
            .all(|e| e.name.as_deref() != Some("Orphan"))
    }));

    let recap = Recapper::default().run(&events, &request(&[], 10, true));
    let summary = cumulative(&recap);
    assert!(summary.top_artists.iter().any(|e| e.name.is_none()));
}

#[test]
fn ties_are_reported() {
    let events = vec![
        play("2024-01-01T00:00:00Z", "a", "X", 60_000),
        play("2024-01-02T00:00:00Z", "b", "Y", 60_000),
        play("2024-01-03T00:00:00Z", "c", "Z", 60_000),
        play("2024-01-04T00:00:00Z", "c", "Z", 60_000),
    ];
    let recap = Recapper::default().run(&events, &request(&[], 2, false));

    assert_eq!(
        recap.ties,
        vec![
            TieExpansion {
                year: Some("2024".into()),
                list: ListKind::Tracks,
                requested: 2,
                found: 3,
            },
            TieExpansion {
                year: Some("2024".into()),
                list: ListKind::Artists,
                requested: 2,
                found: 3,
            },
        ]
    );
    assert_eq!(
        recap.ties[0].to_string(),
        "2024: There was a tie found, so instead of having 2 songs, found 3."
    );

    let recap = Recapper::default().run(&events, &request(&[], 2, true));
    assert_eq!(recap.ties.len(), 2);
    assert!(recap.ties.iter().all(|t| t.year.is_none()));
    assert_eq!(
        recap.ties[1].to_string(),
        "There was a tie found, so instead of having 2 artists, found 3."
    );
}

#[test]
fn short_lists_are_not_ties() {
    let events = vec![play("2024-01-01T00:00:00Z", "a", "X", 60_000)];
    let recap = Recapper::default().run(&events, &request(&[], 5, false));
    assert!(recap.ties.is_empty());
}

#[test]
fn repeated_runs_match() {
    let recapper = Recapper::default();
    let req = request(&[], 1, false);
    assert_eq!(
        recapper.run(&history(), &req).report,
        recapper.run(&history(), &req).report
    );
}

#[test]
fn injected_filter_and_weigher() {
    let mut dates = BTreeMap::new();
    dates.insert("2023".to_string(), "12-31".parse().unwrap());
    let filter = RecordFilter::new(CutoffTable::new(dates, "10-31".parse().unwrap()), 1_000);
    let by_minutes = |e: &ListeningEvent| e.ms_played as f64 / 60_000.0;
    let recapper = Recapper::new(filter).with_weigher(by_minutes);

    let recap = recapper.run(&history(), &request(&["2023"], 1, false));
    let y2023 = &per_year(&recap)["2023"];

    // The December listen now counts, and Björk's 9 minutes beat Bowie's 6.
    assert_eq!(y2023.top_artists[0].name.as_deref(), Some("Björk"));
    assert_eq!(y2023.top_artists[0].count, 9);
    assert_eq!(y2023.total_minutes, 15);
}
