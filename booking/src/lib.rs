//! # Slotbook
//!
//! Booking and ledger reconciliation for venues rented by the time slot.
//!
//! A venue's day is split into fixed-length slots. Clients book slots, pay
//! for them in one or more installments, and every payment lands in a
//! financial ledger. Staff may edit or delete ledger rows directly; those
//! changes flow back into the linked booking's paid amount and payment
//! status so the two views never drift apart.
//!
//! ## Layout
//!
//! - [`types`]: entities, [`Money`](types::Money), [`TimeOfDay`](types::TimeOfDay)
//!   and the three payment status rules
//! - [`slots`]: slot generation and capacity
//! - [`reducer`]: the [`LedgerReducer`] dispatching every [`LedgerAction`]
//! - [`queries`]: client, venue and financial aggregates
//! - [`service`]: [`LedgerService`], a typed facade over the engine
//! - [`config`]: environment-driven configuration
//!
//! ## Example
//!
//! ```ignore
//! use slotbook::{Config, LedgerEnvironment, LedgerReducer, LedgerService, seed};
//! use slotbook_runtime::{Engine, memory::InMemorySnapshotStore};
//!
//! let config = Config::from_env();
//! let env = LedgerEnvironment::production(&config.ledger);
//! let store = InMemorySnapshotStore::new(seed::default_snapshot(env.clock.now()));
//! let service = LedgerService::new(
//!     Engine::new(LedgerReducer::new(), env, store).with_config(config.engine),
//! );
//!
//! let slots = service.slots(&"V1".into(), today)?;
//! ```

pub mod actions;
pub mod audit;
pub mod bookings;
pub mod config;
mod directory;
pub mod environment;
pub mod error;
pub mod payments;
pub mod queries;
pub mod reconciliation;
pub mod reducer;
pub mod seed;
pub mod service;
pub mod slots;
pub mod types;

pub use actions::{DeleteOrigin, LedgerAction};
pub use config::{Config, ConfigError, ConflictPolicy, LedgerConfig};
pub use environment::LedgerEnvironment;
pub use error::LedgerError;
pub use payments::Capture;
pub use queries::DateRange;
pub use reducer::LedgerReducer;
pub use service::{LedgerService, ServiceError, ServiceResult};
