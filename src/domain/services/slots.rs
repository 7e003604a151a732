use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::domain::models::booking::Booking;
use crate::domain::models::session_type::SessionType;
use crate::domain::models::slot::{RawInterval, SlotInstance};

/// Quantizes raw availability intervals into bookable slot instances.
///
/// Slots are cut to each session type's own duration from the interval
/// start; a trailing remainder shorter than one duration is dropped. Full
/// slots and slots starting before `now + min_lead_time` are omitted
/// entirely rather than shown as unbookable.
pub fn materialize(
    teacher_id: &str,
    raw: &[RawInterval],
    session_types: &[SessionType],
    bookings: &[Booking],
    now: DateTime<Utc>,
    min_lead_time: Duration,
) -> Vec<SlotInstance> {
    let types: HashMap<&str, &SessionType> =
        session_types.iter().map(|st| (st.id.as_str(), st)).collect();

    let mut seats_taken: HashMap<(&str, DateTime<Utc>), i64> = HashMap::new();
    for booking in bookings.iter().filter(|b| b.status == "CONFIRMED") {
        *seats_taken
            .entry((booking.session_type_id.as_str(), booking.start_time))
            .or_insert(0) += 1;
    }

    let cutoff = now + min_lead_time;
    let mut slots = Vec::new();

    for interval in raw {
        let Some(session_type) = types.get(interval.session_type_id.as_str()) else {
            continue;
        };
        if session_type.duration_min <= 0 {
            continue;
        }
        let step = Duration::minutes(session_type.duration_min as i64);

        let mut cursor = interval.start;
        while cursor + step <= interval.end {
            let taken = seats_taken
                .get(&(session_type.id.as_str(), cursor))
                .copied()
                .unwrap_or(0);
            let remaining = session_type.capacity as i64 - taken;

            if cursor >= cutoff && remaining > 0 {
                slots.push(SlotInstance {
                    teacher_id: teacher_id.to_string(),
                    session_type_id: session_type.id.clone(),
                    start: cursor,
                    end: cursor + step,
                    capacity_remaining: remaining as i32,
                    price: session_type.price,
                });
            }
            cursor += step;
        }
    }

    slots.sort_by(|a, b| a.start.cmp(&b.start).then(a.session_type_id.cmp(&b.session_type_id)));
    slots
}

/// Checks whether `start` is a valid slot boundary for `session_type`
/// within the given raw intervals. Used by the ledger to revalidate a
/// booking request instead of trusting the client-supplied instant.
pub fn contains_slot(raw: &[RawInterval], session_type: &SessionType, start: DateTime<Utc>) -> bool {
    if session_type.duration_min <= 0 {
        return false;
    }
    let step = Duration::minutes(session_type.duration_min as i64);

    raw.iter()
        .filter(|i| i.session_type_id == session_type.id)
        .any(|i| {
            start >= i.start
                && start + step <= i.end
                && (start - i.start).num_minutes() % session_type.duration_min as i64 == 0
        })
}
