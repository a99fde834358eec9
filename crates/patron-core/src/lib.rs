#![forbid(unsafe_code)]

//! Patron Core
//!
//! Domain layer for the patron profile screen: collection records and the
//! live collection-stream capability, the profile entity with typed route
//! decoding, donation aggregation, and the locale service with its language
//! catalog and translation dictionaries.
//!
//! # Key Components
//!
//! - [`CollectionSource`] - Capability for subscribing to live collection snapshots
//! - [`MemoryCollections`] - In-memory fan-out source (also the test double)
//! - [`RouteEnvelope`] - Navigation payload with typed extraction
//! - [`DonationStats`] - From-scratch fold over a donations snapshot
//! - [`LocaleService`] - Owned locale cell with subscribe/notify and dictionaries
//!
//! # Role in the system
//! `patron-core` carries no screen logic. The `patron-screen` crate wires
//! these capabilities into a subscription lifecycle and a message-driven
//! controller.

pub mod locale;
pub mod profile;
pub mod record;
pub mod stats;

pub use locale::{
    Language, Locale, LocaleService, TranslationDictionary, detect_system_locale,
};
pub use profile::{DecodeError, Profile, ProfileState, RouteEnvelope};
pub use record::{CollectionSource, MemoryCollections, Record};
pub use stats::DonationStats;
