//! Selection of a mergeable date range within one group.

use crate::datetime::parse_flexible;
use crate::registry::{ClipRecord, Group};
use chrono::{NaiveDate, NaiveDateTime};

/// Why a selection was rejected. None of these are fatal: the operator is
/// shown the reason and returned to the menu.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("date range must be '<start> ~ <end>', '<start> - <end>' or 'a'")]
    InvalidDateRangeFormat,

    #[error("could not parse date: {0}")]
    InvalidDateValue(String),

    #[error("range start is after its end")]
    StartAfterEnd,

    #[error("no group with number {0}")]
    UnknownGroup(usize),

    #[error("no clips recorded in the requested range")]
    EmptyRange,

    #[error("a merge needs at least 2 clips, found {0}")]
    TooFewClips(usize),

    #[error("{found} clips exceed the per-merge maximum of {max}")]
    TooManyClips { found: usize, max: usize },
}

/// Parse operator-typed range text into inclusive endpoints.
///
/// The literal `"a"` means everything; otherwise two permissively parsed
/// dates separated by `~` or a spaced `-`. The end endpoint is widened to
/// the last second of its calendar day so a bare date covers the whole day.
pub fn parse_date_range(text: &str) -> Result<(NaiveDateTime, NaiveDateTime), SelectionError> {
    let text = text.trim();

    if text == "a" {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or(SelectionError::InvalidDateRangeFormat)?;
        let end = NaiveDate::from_ymd_opt(2100, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .ok_or(SelectionError::InvalidDateRangeFormat)?;
        return Ok((start, end));
    }

    // dates themselves contain '-', so the hyphen separator must be spaced
    let (start_text, end_text) = text
        .split_once('~')
        .or_else(|| text.split_once(" - "))
        .ok_or(SelectionError::InvalidDateRangeFormat)?;

    let start = parse_flexible(start_text)
        .ok_or_else(|| SelectionError::InvalidDateValue(start_text.trim().to_string()))?;
    let end = parse_flexible(end_text)
        .ok_or_else(|| SelectionError::InvalidDateValue(end_text.trim().to_string()))?;

    let end = end
        .date()
        .and_hms_opt(23, 59, 59)
        .ok_or(SelectionError::InvalidDateRangeFormat)?;

    if start > end {
        return Err(SelectionError::StartAfterEnd);
    }

    Ok((start, end))
}

/// Filter a group down to the clips recorded inside the range, preserving
/// the group's sorted order, and validate the result is mergeable.
pub fn select<'a>(
    group: &Group<'a>,
    range_text: &str,
    max_clips: usize,
) -> Result<Vec<&'a ClipRecord>, SelectionError> {
    let (start, end) = parse_date_range(range_text)?;

    let matched: Vec<&ClipRecord> = group
        .clips
        .iter()
        .filter(|clip| start <= clip.recorded_at && clip.recorded_at <= end)
        .copied()
        .collect();

    match matched.len() {
        0 => Err(SelectionError::EmptyRange),
        1 => Err(SelectionError::TooFewClips(1)),
        found if found > max_clips => Err(SelectionError::TooManyClips {
            found,
            max: max_clips,
        }),
        _ => Ok(matched),
    }
}

/// Like [`select`], but resolves the group from its menu number first
pub fn select_from<'a>(
    groups: &[Group<'a>],
    index: usize,
    range_text: &str,
    max_clips: usize,
) -> Result<Vec<&'a ClipRecord>, SelectionError> {
    let group = groups.get(index).ok_or(SelectionError::UnknownGroup(index))?;
    select(group, range_text, max_clips)
}
