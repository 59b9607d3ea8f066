//! Client and venue registries.
//!
//! Neither clients nor venues are ever deleted; both are deactivated through
//! their `active` flag.

use crate::actions::{ClientChanges, NewClient, NewVenue, VenueChanges};
use crate::audit;
use crate::environment::LedgerEnvironment;
use crate::error::LedgerError;
use crate::reducer::{Effects, locate};
use crate::types::{Client, ClientId, Snapshot, Venue, VenueId};
use slotbook_core::smallvec;

fn require(value: &str, what: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::validation(format!("{what} is required")));
    }
    Ok(())
}

fn require_slot_duration(minutes: u16) -> Result<(), LedgerError> {
    if minutes == 0 {
        return Err(LedgerError::validation("slot duration must be greater than zero"));
    }
    Ok(())
}

/// Registers a client. Name and phone are required.
pub(crate) fn register_client(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    new: NewClient,
) -> Result<Effects, LedgerError> {
    require(&new.name, "client name")?;
    require(&new.phone, "client phone")?;

    let client = Client {
        id: ClientId::new(env.ids.new_id("CL")),
        name: new.name,
        phone: new.phone,
        email: new.email,
        address: new.address,
        active: true,
        created_at: env.clock.now(),
    };
    let details = format!(
        "Manually registered new client: {} ({})",
        client.name, client.phone
    );
    tracing::debug!(client_id = %client.id, "Client registered");
    state.clients.push(client);

    Ok(smallvec![audit::record(state, env, "ADD_CLIENT", details)])
}

/// Updates a client's profile.
pub(crate) fn update_client(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    client_id: &ClientId,
    changes: ClientChanges,
) -> Result<Effects, LedgerError> {
    let idx = locate(&state.clients, "client", client_id.as_str(), |c| {
        c.id.as_str()
    })?;
    let mut next = state.clients[idx].clone();

    if let Some(name) = changes.name {
        next.name = name;
    }
    if let Some(phone) = changes.phone {
        next.phone = phone;
    }
    if let Some(email) = changes.email {
        next.email = email;
    }
    if let Some(address) = changes.address {
        next.address = address;
    }
    if let Some(active) = changes.active {
        next.active = active;
    }
    require(&next.name, "client name")?;
    require(&next.phone, "client phone")?;

    let details = format!("Updated profile for client {client_id}: {}", next.name);
    state.clients[idx] = next;

    Ok(smallvec![audit::record(state, env, "EDIT_CLIENT", details)])
}

/// Registers a venue. Name and a positive slot duration are required.
pub(crate) fn register_venue(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    new: NewVenue,
) -> Result<Effects, LedgerError> {
    require(&new.name, "venue name")?;
    require_slot_duration(new.slot_duration)?;

    let venue = Venue {
        id: VenueId::new(env.ids.new_id("V")),
        name: new.name,
        address: new.address,
        notes: new.notes,
        active: true,
        opening_time: new.opening_time,
        closing_time: new.closing_time,
        slot_duration: new.slot_duration,
        base_price: new.base_price,
    };
    if venue.closing_time <= venue.opening_time {
        tracing::warn!(venue_id = %venue.id, "Venue closes before it opens and offers no slots");
    }
    let details = format!("Venue {} was created.", venue.name);
    state.venues.push(venue);

    Ok(smallvec![audit::record(state, env, "ADD_VENUE", details)])
}

/// Updates a venue's profile or hours.
///
/// Existing bookings are not moved when hours or slot length change.
pub(crate) fn update_venue(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    venue_id: &VenueId,
    changes: VenueChanges,
) -> Result<Effects, LedgerError> {
    let idx = locate(&state.venues, "venue", venue_id.as_str(), |v| v.id.as_str())?;
    let mut next = state.venues[idx].clone();

    if let Some(name) = changes.name {
        next.name = name;
    }
    if let Some(address) = changes.address {
        next.address = address;
    }
    if let Some(notes) = changes.notes {
        next.notes = notes;
    }
    if let Some(opening_time) = changes.opening_time {
        next.opening_time = opening_time;
    }
    if let Some(closing_time) = changes.closing_time {
        next.closing_time = closing_time;
    }
    if let Some(slot_duration) = changes.slot_duration {
        next.slot_duration = slot_duration;
    }
    if let Some(base_price) = changes.base_price {
        next.base_price = base_price;
    }
    if let Some(active) = changes.active {
        next.active = active;
    }
    require(&next.name, "venue name")?;
    require_slot_duration(next.slot_duration)?;

    let details = format!("Venue {} was updated.", next.name);
    state.venues[idx] = next;

    Ok(smallvec![audit::record(state, env, "EDIT_VENUE", details)])
}

/// Flips a venue between active and inactive.
pub(crate) fn toggle_venue_status(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    venue_id: &VenueId,
) -> Result<Effects, LedgerError> {
    let idx = locate(&state.venues, "venue", venue_id.as_str(), |v| v.id.as_str())?;
    let venue = &mut state.venues[idx];
    venue.active = !venue.active;
    let details = format!(
        "Venue {} status changed to {}",
        venue.name,
        if venue.active { "Active" } else { "Inactive" }
    );

    Ok(smallvec![audit::record(state, env, "TOGGLE_VENUE_STATUS", details)])
}
