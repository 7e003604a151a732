use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono::offset::LocalResult;
use chrono_tz::Tz;
use std::cmp::max;

use crate::domain::models::availability_rule::AvailabilityRule;
use crate::domain::models::date_exception::DateException;
use crate::domain::models::slot::RawInterval;

/// Expands weekly rules plus date exceptions into concrete UTC intervals
/// over the window `[from, to)` of local dates. Pure function of its inputs.
///
/// Evaluation order per date: whole-day block > interval block > added.
/// Intervals for the same session type are merged when contiguous or
/// overlapping; different session types are independent capacity pools and
/// stay distinct even when they cover the same wall-clock span.
pub fn expand(
    rules: &[AvailabilityRule],
    exceptions: &[DateException],
    tz: Tz,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<RawInterval> {
    let mut intervals: Vec<RawInterval> = Vec::new();

    let mut date = from;
    while date < to {
        let weekday = date.weekday().num_days_from_monday() as i32;
        let day_exceptions: Vec<&DateException> =
            exceptions.iter().filter(|e| e.date == date).collect();
        let whole_day_blocked = day_exceptions.iter().any(|e| e.blocks_whole_day());

        if !whole_day_blocked {
            for rule in rules.iter().filter(|r| r.active && r.weekday == weekday) {
                if !rule.covers_date(date) {
                    continue;
                }
                // A wall-clock time swallowed by a DST gap drops the day.
                let Some(span) = local_span_to_utc(tz, date, rule.start_time, rule.end_time) else {
                    continue;
                };

                let mut pieces = vec![span];
                for exc in day_exceptions.iter().filter(|e| e.kind == "BLOCKED") {
                    if let (Some(b_start), Some(b_end)) = (exc.start_time, exc.end_time)
                        && let Some((block_start, block_end)) = local_span_to_utc(tz, date, b_start, b_end) {
                        pieces = subtract(pieces, block_start, block_end);
                    }
                }

                for (start, end) in pieces {
                    intervals.push(RawInterval {
                        session_type_id: rule.session_type_id.clone(),
                        start,
                        end,
                    });
                }
            }

            for exc in day_exceptions.iter().filter(|e| e.kind == "ADDED") {
                if let (Some(start), Some(end), Some(session_type_id)) =
                    (exc.start_time, exc.end_time, exc.session_type_id.as_ref())
                    && let Some((start_utc, end_utc)) = local_span_to_utc(tz, date, start, end) {
                    intervals.push(RawInterval {
                        session_type_id: session_type_id.clone(),
                        start: start_utc,
                        end: end_utc,
                    });
                }
            }
        }

        date += Duration::days(1);
    }

    merge_per_session_type(intervals)
}

/// Resolves a local wall-clock instant to UTC. Ambiguous times (DST fold)
/// take the earlier offset; nonexistent times (DST gap) yield None.
fn resolve_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

fn local_span_to_utc(
    tz: Tz,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start_utc = resolve_local(tz, date, start)?;
    let end_utc = resolve_local(tz, date, end)?;
    (start_utc < end_utc).then_some((start_utc, end_utc))
}

/// Subtracts `[block_start, block_end)` from every piece. Partial overlap
/// splits a piece into zero, one, or two remainders.
fn subtract(
    pieces: Vec<(DateTime<Utc>, DateTime<Utc>)>,
    block_start: DateTime<Utc>,
    block_end: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut out = Vec::with_capacity(pieces.len());
    for (start, end) in pieces {
        if block_end <= start || block_start >= end {
            out.push((start, end));
            continue;
        }
        if block_start > start {
            out.push((start, block_start));
        }
        if block_end < end {
            out.push((block_end, end));
        }
    }
    out
}

fn merge_per_session_type(mut intervals: Vec<RawInterval>) -> Vec<RawInterval> {
    intervals.sort_by(|a, b| {
        a.session_type_id
            .cmp(&b.session_type_id)
            .then(a.start.cmp(&b.start))
            .then(a.end.cmp(&b.end))
    });

    let mut merged: Vec<RawInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last)
                if last.session_type_id == interval.session_type_id
                    && interval.start <= last.end =>
            {
                last.end = max(last.end, interval.end);
            }
            _ => merged.push(interval),
        }
    }

    merged.sort_by(|a, b| a.start.cmp(&b.start).then(a.session_type_id.cmp(&b.session_type_id)));
    merged
}
