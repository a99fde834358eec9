#![forbid(unsafe_code)]

//! The profile screen controller.
//!
//! [`ProfileScreen`] owns every state slice of the screen and a single
//! tagged-message channel. Activation opens five subscriptions (three
//! collection feeds, the single-shot route resolution, and the locale
//! change stream); each writes a disjoint slice of state, so their
//! emissions may interleave in any order. Deactivation releases all of
//! them exactly once, after which messages still in flight are discarded
//! without touching state.
//!
//! Background threads never mutate screen state. They forward tagged
//! [`ScreenMsg`] values into the channel, and the controller applies them
//! when the host pumps [`process_pending`](ProfileScreen::process_pending).

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use patron_core::{
    CollectionSource, DecodeError, DonationStats, Locale, LocaleService, Profile, ProfileState,
    Record, RouteEnvelope, TranslationDictionary,
};

use crate::chooser::{
    ButtonRole, ChooserError, DialogButton, DialogConfig, DialogOutcome, DialogPresenter,
    language_options,
};
use crate::nav::Navigator;
use crate::subscription::{ChannelSubscription, OnceSubscription, SubscriptionSet};

/// Tagged message, one variant per data source.
#[derive(Debug)]
pub enum ScreenMsg {
    /// Full "slides" snapshot; replaces the slide list wholesale.
    Slides(Vec<Record>),
    /// Full "projects" snapshot; replaces the project list wholesale.
    Projects(Vec<Record>),
    /// Full "donations" snapshot; statistics are recomputed from scratch.
    Donations(Vec<Record>),
    /// Outcome of the single-shot route resolution.
    ProfileResolved(Result<Profile, DecodeError>),
    /// The active locale changed; the dictionary must be refreshed.
    LocaleChanged(Locale),
}

/// Controller tuning knobs.
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    /// How often quiet subscription loops wake to observe their stop signal.
    pub poll_interval: Duration,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(25),
        }
    }
}

/// The profile screen controller.
pub struct ProfileScreen {
    config: ScreenConfig,
    locale: Arc<LocaleService>,

    profile: ProfileState,
    projects: Vec<Record>,
    slides: Vec<Record>,
    donation_stats: DonationStats,
    translations: TranslationDictionary,

    subscriptions: SubscriptionSet,
    sender: mpsc::Sender<ScreenMsg>,
    receiver: mpsc::Receiver<ScreenMsg>,
    active: bool,
}

impl ProfileScreen {
    #[must_use]
    pub fn new(locale: Arc<LocaleService>) -> Self {
        Self::with_config(locale, ScreenConfig::default())
    }

    #[must_use]
    pub fn with_config(locale: Arc<LocaleService>, config: ScreenConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            config,
            locale,
            profile: ProfileState::default(),
            projects: Vec::new(),
            slides: Vec::new(),
            donation_stats: DonationStats::default(),
            translations: TranslationDictionary::new(),
            subscriptions: SubscriptionSet::new(),
            sender,
            receiver,
            active: false,
        }
    }

    /// Run the activation protocol. Called once when the screen becomes
    /// visible; a second call while active is ignored.
    ///
    /// A fresh activation starts from empty state: nothing is cached across
    /// activation periods.
    pub fn activate(&mut self, collections: &dyn CollectionSource, route: RouteEnvelope) {
        if self.active {
            tracing::warn!("activate called while already active; ignoring");
            return;
        }
        self.reset_state();
        self.active = true;
        let poll = self.config.poll_interval;

        self.subscriptions.spawn(
            Box::new(ChannelSubscription::new(
                "slides",
                collections.subscribe("slides"),
                poll,
                ScreenMsg::Slides,
            )),
            self.sender.clone(),
        );
        self.subscriptions.spawn(
            Box::new(ChannelSubscription::new(
                "projects",
                collections.subscribe("projects"),
                poll,
                ScreenMsg::Projects,
            )),
            self.sender.clone(),
        );
        self.subscriptions.spawn(
            Box::new(ChannelSubscription::new(
                "donations",
                collections.subscribe("donations"),
                poll,
                ScreenMsg::Donations,
            )),
            self.sender.clone(),
        );
        self.subscriptions.spawn(
            Box::new(OnceSubscription::new(
                "route",
                ScreenMsg::ProfileResolved(route.extract::<Profile>()),
            )),
            self.sender.clone(),
        );
        self.subscriptions.spawn(
            Box::new(ChannelSubscription::new(
                "locale",
                self.locale.subscribe_changes(),
                poll,
                ScreenMsg::LocaleChanged,
            )),
            self.sender.clone(),
        );
        tracing::debug!(subscriptions = self.subscriptions.len(), "screen activated");
    }

    /// Release every subscription exactly once and drop the screen state.
    /// Idempotent, and safe even if activation only partially completed.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.subscriptions.release_all();
        // All forwarding threads have joined, so the channel can be fully
        // drained here; nothing from this activation may leak into the next.
        while self.receiver.try_recv().is_ok() {}
        self.reset_state();
        tracing::debug!("screen deactivated");
    }

    /// Drain and apply every pending message. Call from the host's tick.
    pub fn process_pending(&mut self) {
        while let Ok(msg) = self.receiver.try_recv() {
            self.apply(msg);
        }
    }

    /// The single state-transition function.
    fn apply(&mut self, msg: ScreenMsg) {
        if !self.active {
            tracing::trace!("discarding message received after deactivation");
            return;
        }
        match msg {
            ScreenMsg::Slides(slides) => {
                self.slides = slides;
            }
            ScreenMsg::Projects(projects) => {
                self.projects = projects;
            }
            ScreenMsg::Donations(records) => {
                self.donation_stats = DonationStats::from_records(&records);
            }
            ScreenMsg::ProfileResolved(Ok(profile)) => {
                self.profile.set_profile(Some(profile));
                // Chooser text depends on the dictionary, so refresh
                // synchronously once the profile lands.
                self.refresh_translations();
            }
            ScreenMsg::ProfileResolved(Err(error)) => {
                // The other subscriptions are independent and keep running.
                tracing::warn!(error = %error, "profile resolution failed");
            }
            ScreenMsg::LocaleChanged(locale) => {
                tracing::debug!(locale = %locale, "locale changed; refreshing translations");
                self.refresh_translations();
            }
        }
    }

    /// Replace the dictionary wholesale for the current locale.
    fn refresh_translations(&mut self) {
        self.translations = self.locale.dictionary(&self.locale.current_locale());
    }

    /// Hand the selected project to the router as transient state.
    pub fn open_project(&self, project: &Record, navigator: &dyn Navigator) {
        navigator.navigate("/contact-card", project.clone());
    }

    /// Present the locale chooser and, on confirm with a selection, switch
    /// the active locale.
    ///
    /// Disabled until the first translation refresh has completed. The
    /// switch itself only notifies the locale service; the dictionary is
    /// refreshed asynchronously by the locale-change subscription, never by
    /// the chooser directly.
    pub fn open_language_chooser(
        &self,
        dialogs: &dyn DialogPresenter,
    ) -> Result<(), ChooserError> {
        if self.translations.is_empty() {
            return Err(ChooserError::TranslationsNotReady);
        }
        let config = DialogConfig {
            header: self.label("SELECT_LANGUAGE"),
            inputs: language_options(&self.locale.languages(), &self.locale.current_locale()),
            buttons: vec![
                DialogButton {
                    label: self.label("CANCEL"),
                    role: ButtonRole::Cancel,
                },
                DialogButton {
                    label: self.label("OK"),
                    role: ButtonRole::Confirm,
                },
            ],
        };
        match dialogs.present(config) {
            DialogOutcome::Confirmed(Some(code)) => self.locale.set_locale(code),
            DialogOutcome::Confirmed(None) | DialogOutcome::Cancelled => {}
        }
        Ok(())
    }

    fn label(&self, key: &str) -> String {
        self.translations
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn reset_state(&mut self) {
        self.profile = ProfileState::default();
        self.projects.clear();
        self.slides.clear();
        self.donation_stats = DonationStats::default();
        self.translations = TranslationDictionary::new();
    }

    // --- read-side accessors for the view layer ---

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.profile()
    }

    /// Loading visual mode: true until a non-shell profile resolves.
    #[must_use]
    pub fn is_shell(&self) -> bool {
        self.profile.is_shell()
    }

    #[must_use]
    pub fn projects(&self) -> &[Record] {
        &self.projects
    }

    #[must_use]
    pub fn slides(&self) -> &[Record] {
        &self.slides
    }

    #[must_use]
    pub fn donation_stats(&self) -> DonationStats {
        self.donation_stats
    }

    #[must_use]
    pub fn translations(&self) -> &TranslationDictionary {
        &self.translations
    }
}
