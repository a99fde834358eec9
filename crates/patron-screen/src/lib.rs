#![forbid(unsafe_code)]

//! Patron Screen
//!
//! The profile screen controller and its subscription lifecycle. The
//! controller merges a route-resolved profile with three live collection
//! feeds and a locale-change stream, owns every state slice of the screen,
//! and guarantees deterministic teardown of all subscriptions on
//! deactivation.
//!
//! # Key Components
//!
//! - [`ProfileScreen`] - The screen controller and its activation protocol
//! - [`ScreenMsg`] - Tagged messages, one variant per data source
//! - [`SubscriptionSet`] - Owner of the running subscription handles
//! - [`ScreenSubscription`] - Trait for sources that feed the message channel
//! - [`DialogPresenter`] / [`Navigator`] - Injected presentation collaborators
//!
//! # How it fits in the system
//! `patron-core` supplies the data model and capabilities; this crate wires
//! them into a single-threaded state owner fed by one tagged-message
//! channel. The view layer reads the controller's state slices and calls
//! its two interactions (project selection and the language chooser).

pub mod chooser;
pub mod controller;
pub mod nav;
pub mod subscription;

pub use chooser::{
    ButtonRole, ChooserError, DialogButton, DialogConfig, DialogOutcome, DialogPresenter,
    LanguageOption, ScriptedPresenter, language_options,
};
pub use controller::{ProfileScreen, ScreenConfig, ScreenMsg};
pub use nav::{Navigator, RecordingNavigator};
pub use subscription::{
    ChannelSubscription, OnceSubscription, ScreenSubscription, StopSignal, SubscriptionSet,
};
