//! Slot availability.
//!
//! Slots are never stored. They are derived on every call from the venue's
//! hours and the ACTIVE bookings for the date.

use crate::types::{Booking, BookingStatus, Slot, TimeOfDay, Venue};
use chrono::NaiveDate;

/// Ordered bookable windows of `venue` on `date`.
///
/// Starts at the opening time and steps by the slot duration while the slot
/// still ends at or before closing. Each slot carries the first ACTIVE
/// booking of this venue and date starting exactly at the slot start.
///
/// Misconfigured hours (`opening >= closing`) and a zero slot duration both
/// yield no slots.
#[must_use]
pub fn generate_slots(venue: &Venue, date: NaiveDate, bookings: &[Booking]) -> Vec<Slot> {
    slot_windows(venue)
        .map(|(start, end)| Slot {
            start,
            end,
            venue_id: venue.id.clone(),
            date,
            booking: bookings
                .iter()
                .find(|b| {
                    b.venue_id == venue.id
                        && b.date == date
                        && b.start_time == start
                        && b.status == BookingStatus::Active
                })
                .cloned(),
        })
        .collect()
}

/// `(start, end)` of every slot the venue offers on any day
pub fn slot_windows(venue: &Venue) -> impl Iterator<Item = (TimeOfDay, TimeOfDay)> + '_ {
    let step = venue.slot_duration;
    let close = venue.closing_time.minutes();
    let mut current = venue.opening_time.minutes();

    std::iter::from_fn(move || {
        if step == 0 {
            return None;
        }
        let end = current.checked_add(step)?;
        if end > close {
            return None;
        }
        let window = (TimeOfDay::from_minutes(current)?, TimeOfDay::from_minutes(end)?);
        current = end;
        Some(window)
    })
}

/// The venue's slot window starting at `start`, if there is one
#[must_use]
pub fn slot_at(venue: &Venue, start: TimeOfDay) -> Option<(TimeOfDay, TimeOfDay)> {
    slot_windows(venue).find(|(s, _)| *s == start)
}

/// Number of slots per day: `floor((closing - opening) / duration)`
#[must_use]
pub fn daily_capacity(venue: &Venue) -> u32 {
    let open = venue.opening_time.minutes();
    let close = venue.closing_time.minutes();
    if venue.slot_duration == 0 || close <= open {
        return 0;
    }
    u32::from((close - open) / venue.slot_duration)
}
