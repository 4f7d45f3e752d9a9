//! Gap and overlap classification between two tiers.
//!
//! The timeline spanned by both tiers is split into maximal runs of one
//! [`Activity`]; silent runs and simultaneous runs are then classified by
//! the activity on either side of them. The sweep visits annotation
//! boundaries only, so its cost depends on the number of annotations and
//! not on the length of the recording.

use serde::Serialize;
use std::fmt;

use crate::eaf::{AnnotationSpan, Millis};

/// Which of the two tiers covers a stretch of time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Activity {
    Both,
    OnlyFirst,
    OnlySecond,
    Neither,
}

impl Activity {
    fn from_coverage(first: bool, second: bool) -> Self {
        match (first, second) {
            (true, true) => Activity::Both,
            (true, false) => Activity::OnlyFirst,
            (false, true) => Activity::OnlySecond,
            (false, false) => Activity::Neither,
        }
    }
}

/// A maximal stretch `[start, end)` with a single activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActivityRun {
    pub activity: Activity,
    pub start: Millis,
    pub end: Millis,
}

impl ActivityRun {
    pub fn duration(&self) -> Millis {
        self.end - self.start
    }
}

/// Classification of a silent or simultaneous run.
///
/// "12" variants mean the first tier was active just before the run; every
/// other predecessor (second tier, both, or none at the boundary) yields
/// the "21" variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Transition {
    /// Silence between first and second tier.
    Gap12,
    /// Silence between second and first tier.
    Gap21,
    /// Silence within the first tier's turn.
    Pause1,
    /// Silence within the second tier's turn.
    Pause2,
    /// Overlap while the turn passes from first to second.
    Overlap12,
    /// Overlap while the turn passes from second to first.
    Overlap21,
    /// Overlap that does not change the turn, first tier leading.
    Within12,
    /// Overlap that does not change the turn, second tier leading.
    Within21,
}

impl Transition {
    /// Label in the conventional `G12_a_b` / `P_a` / `B_a_b` notation.
    pub fn label(&self, first: &str, second: &str) -> String {
        match self {
            Transition::Gap12 => format!("G12_{first}_{second}"),
            Transition::Gap21 => format!("G21_{second}_{first}"),
            Transition::Pause1 => format!("P_{first}"),
            Transition::Pause2 => format!("P_{second}"),
            Transition::Overlap12 => format!("O12_{first}_{second}"),
            Transition::Overlap21 => format!("O21_{second}_{first}"),
            Transition::Within12 => format!("B_{first}_{second}"),
            Transition::Within21 => format!("B_{second}_{first}"),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Transition::Gap12 => "G12",
            Transition::Gap21 => "G21",
            Transition::Pause1 => "P1",
            Transition::Pause2 => "P2",
            Transition::Overlap12 => "O12",
            Transition::Overlap21 => "O21",
            Transition::Within12 => "B12",
            Transition::Within21 => "B21",
        };
        f.write_str(code)
    }
}

/// A classified `[start, end)` interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ClassifiedInterval {
    pub kind: Transition,
    pub start: Millis,
    pub end: Millis,
}

impl ClassifiedInterval {
    pub fn duration(&self) -> Millis {
        self.end - self.start
    }
}

/// Splits the combined range of both span sets into maximal activity runs.
///
/// The range runs from the earliest start to the latest end over both
/// sets; a span covers the instants `start <= t < end`.
pub fn activity_runs(first: &[AnnotationSpan], second: &[AnnotationSpan]) -> Vec<ActivityRun> {
    let bounds = first
        .iter()
        .chain(second)
        .map(|s| (s.start.min(s.end), s.start.max(s.end)))
        .reduce(|(lo, hi), (s, e)| (lo.min(s), hi.max(e)));
    let Some((lo, hi)) = bounds else {
        return Vec::new();
    };

    // (time, delta for first, delta for second)
    let mut events: Vec<(Millis, i64, i64)> = Vec::with_capacity(2 * (first.len() + second.len()));
    for span in first.iter().filter(|s| s.end > s.start) {
        events.push((span.start, 1, 0));
        events.push((span.end, -1, 0));
    }
    for span in second.iter().filter(|s| s.end > s.start) {
        events.push((span.start, 0, 1));
        events.push((span.end, 0, -1));
    }
    events.sort_unstable();

    let mut runs: Vec<ActivityRun> = Vec::new();
    let (mut depth_first, mut depth_second) = (0i64, 0i64);
    let mut pending = events.into_iter().peekable();
    let mut cursor = lo;

    while cursor < hi {
        while let Some(&(at, d1, d2)) = pending.peek() {
            if at > cursor {
                break;
            }
            depth_first += d1;
            depth_second += d2;
            pending.next();
        }

        let next = pending.peek().map_or(hi, |&(at, _, _)| at.min(hi));
        let activity = Activity::from_coverage(depth_first > 0, depth_second > 0);

        match runs.last_mut() {
            Some(last) if last.activity == activity => last.end = next,
            _ => runs.push(ActivityRun {
                activity,
                start: cursor,
                end: next,
            }),
        }
        cursor = next;
    }

    runs
}

/// Classifies every `Neither` and `Both` run by its neighbours.
///
/// A run is a transition when it has a run on both sides and those two
/// differ: silent transitions are gaps, simultaneous ones overlaps.
/// Otherwise a silent run is a pause and a simultaneous run is a `B`
/// (within-turn) overlap.
pub fn classify_runs(runs: &[ActivityRun]) -> Vec<ClassifiedInterval> {
    let mut out = Vec::new();

    for (idx, run) in runs.iter().enumerate() {
        let prev = idx.checked_sub(1).map(|i| runs[i].activity);
        let next = runs.get(idx + 1).map(|r| r.activity);
        let first_led = prev == Some(Activity::OnlyFirst);
        let changes_hands = matches!((prev, next), (Some(p), Some(n)) if p != n);

        let kind = match (run.activity, changes_hands, first_led) {
            (Activity::Neither, true, true) => Transition::Gap12,
            (Activity::Neither, true, false) => Transition::Gap21,
            (Activity::Neither, false, true) => Transition::Pause1,
            (Activity::Neither, false, false) => Transition::Pause2,
            (Activity::Both, true, true) => Transition::Overlap12,
            (Activity::Both, true, false) => Transition::Overlap21,
            (Activity::Both, false, true) => Transition::Within12,
            (Activity::Both, false, false) => Transition::Within21,
            (Activity::OnlyFirst | Activity::OnlySecond, _, _) => continue,
        };

        out.push(ClassifiedInterval {
            kind,
            start: run.start,
            end: run.end,
        });
    }

    out
}

/// Keeps intervals strictly shorter than `max_len`; `None` keeps all.
pub fn filter_by_length(
    intervals: Vec<ClassifiedInterval>,
    max_len: Option<Millis>,
) -> Vec<ClassifiedInterval> {
    match max_len {
        None => intervals,
        Some(max) => intervals
            .into_iter()
            .filter(|i| i.duration().abs() < max)
            .collect(),
    }
}
