//! The snapshot a fresh installation starts from.

use crate::types::{Client, Money, Snapshot, TimeOfDay, Venue};
use chrono::{DateTime, Utc};

fn venue(
    id: &str,
    name: &str,
    address: &str,
    notes: &str,
    hours: (u8, u8),
    slot_duration: u16,
    base_price: i64,
) -> Venue {
    Venue {
        id: id.into(),
        name: name.to_string(),
        address: address.to_string(),
        notes: notes.to_string(),
        active: true,
        opening_time: TimeOfDay::on_the_hour(hours.0),
        closing_time: TimeOfDay::on_the_hour(hours.1),
        slot_duration,
        base_price: Money::new(base_price),
    }
}

fn client(id: &str, name: &str, phone: &str, email: &str, address: &str, now: DateTime<Utc>) -> Client {
    Client {
        id: id.into(),
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        address: address.to_string(),
        active: true,
        created_at: now,
    }
}

/// Two venues and two clients, no bookings and an empty ledger.
#[must_use]
pub fn default_snapshot(now: DateTime<Utc>) -> Snapshot {
    Snapshot {
        venues: vec![
            venue("V1", "Main Cricket Turf", "Dhaka, Bangladesh", "Best for 6v6", (8, 23), 90, 2000),
            venue("V2", "Football Arena", "Uttara, Sector 4", "Synthetic grass", (6, 22), 60, 1500),
        ],
        clients: vec![
            client("CL-000001", "Zayed Ahmed", "01700000001", "zayed@example.com", "Banani", now),
            client("CL-000002", "Rohan Kabir", "01800000002", "rohan@example.com", "Gulshan", now),
        ],
        ..Snapshot::default()
    }
}
