//! Candidate filtering and selection by publish date
//!
//! Everything here is pure: no I/O, no clock, same answer for the same input.

use chrono::{DateTime, Utc};

use crate::version::types::{Candidate, Cutoff, InvalidReason, ResolvedVersion, Validity};

/// Outcome of checking one candidate against a cutoff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    Invalid(InvalidReason),
    AfterCutoff,
}

/// Returned when no candidate qualifies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoVersionBeforeDate;

pub fn assess(candidate: &Candidate, cutoff: Cutoff) -> Verdict {
    match (&candidate.validity, candidate.published_at) {
        (Validity::Invalid(reason), _) => Verdict::Invalid(reason.clone()),
        (Validity::Valid, None) => Verdict::Invalid(InvalidReason::MissingTimestamp),
        (Validity::Valid, Some(at)) if cutoff.admits(at) => Verdict::Eligible,
        (Validity::Valid, Some(_)) => Verdict::AfterCutoff,
    }
}

/// Picks the most recently published valid candidate at or before `cutoff`
///
/// When two qualifying candidates share a publish time, the one listed later
/// by the registry wins.
pub fn select(
    candidates: &[Candidate],
    cutoff: Cutoff,
) -> Result<ResolvedVersion, NoVersionBeforeDate> {
    let mut best: Option<(&Candidate, DateTime<Utc>)> = None;

    for candidate in candidates {
        if assess(candidate, cutoff) != Verdict::Eligible {
            continue;
        }
        let Some(at) = candidate.published_at else {
            continue;
        };
        if best.is_none_or(|(_, best_at)| at >= best_at) {
            best = Some((candidate, at));
        }
    }

    best.map(|(candidate, published_at)| ResolvedVersion {
        version: candidate.version.clone(),
        published_at,
    })
    .ok_or(NoVersionBeforeDate)
}
