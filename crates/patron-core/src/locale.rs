#![forbid(unsafe_code)]

//! Locale service, language catalog, and translation dictionaries.
//!
//! [`LocaleService`] owns the current locale as a single mutable cell with
//! a subscribe/notify contract. It is injected into the screen controller
//! rather than accessed as an ambient global; switching the locale fires a
//! change notification to every subscriber, and the dictionary for any
//! locale can be looked up at any time.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::sync::Mutex;
use std::sync::mpsc;

/// A normalized BCP 47-ish language tag, e.g. `"en"` or `"fr-CA"`.
pub type Locale = String;

/// Message key to localized string, replaced wholesale on locale change.
pub type TranslationDictionary = HashMap<String, String>;

/// One entry of the language catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub name: String,
    pub code: String,
}

impl Language {
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

const EN_DICTIONARY: &str = r#"{
  "SELECT_LANGUAGE": "Select language",
  "CANCEL": "Cancel",
  "OK": "OK",
  "PROJECTS": "Projects",
  "DONATIONS": "Donations",
  "CONTRIBUTORS": "Contributors"
}"#;

const FR_DICTIONARY: &str = r#"{
  "SELECT_LANGUAGE": "Choisir la langue",
  "CANCEL": "Annuler",
  "OK": "OK",
  "PROJECTS": "Projets",
  "DONATIONS": "Dons",
  "CONTRIBUTORS": "Contributeurs"
}"#;

const ES_DICTIONARY: &str = r#"{
  "SELECT_LANGUAGE": "Seleccionar idioma",
  "CANCEL": "Cancelar",
  "OK": "OK",
  "PROJECTS": "Proyectos",
  "DONATIONS": "Donaciones",
  "CONTRIBUTORS": "Contribuyentes"
}"#;

fn default_catalog() -> Vec<Language> {
    vec![
        Language::new("English", "en"),
        Language::new("Français", "fr"),
        Language::new("Español", "es"),
    ]
}

fn default_dictionaries() -> HashMap<Locale, TranslationDictionary> {
    let mut dictionaries = HashMap::new();
    for (code, raw) in [
        ("en", EN_DICTIONARY),
        ("fr", FR_DICTIONARY),
        ("es", ES_DICTIONARY),
    ] {
        let dictionary =
            serde_json::from_str(raw).expect("embedded dictionary is valid JSON");
        dictionaries.insert(code.to_string(), dictionary);
    }
    dictionaries
}

struct LocaleInner {
    current: Locale,
    version: u64,
    subscribers: Vec<mpsc::Sender<Locale>>,
    dictionaries: HashMap<Locale, TranslationDictionary>,
    languages: Vec<Language>,
}

/// Owned mutable locale cell with subscribe/notify.
pub struct LocaleService {
    inner: Mutex<LocaleInner>,
}

impl LocaleService {
    /// Create a service with the default catalog and embedded dictionaries.
    #[must_use]
    pub fn new(initial: impl Into<Locale>) -> Self {
        Self {
            inner: Mutex::new(LocaleInner {
                current: normalize_locale(initial.into()),
                version: 0,
                subscribers: Vec::new(),
                dictionaries: default_dictionaries(),
                languages: default_catalog(),
            }),
        }
    }

    /// Create a service initialized from system locale detection.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(detect_system_locale())
    }

    /// Replace the language catalog.
    #[must_use]
    pub fn with_catalog(self, languages: Vec<Language>) -> Self {
        {
            let mut inner = self.lock();
            inner.languages = languages;
        }
        self
    }

    /// Register or replace the dictionary for a locale.
    #[must_use]
    pub fn with_dictionary(self, locale: impl Into<Locale>, dictionary: TranslationDictionary) -> Self {
        {
            let mut inner = self.lock();
            inner
                .dictionaries
                .insert(normalize_locale(locale.into()), dictionary);
        }
        self
    }

    /// The active locale.
    #[must_use]
    pub fn current_locale(&self) -> Locale {
        self.lock().current.clone()
    }

    /// Version counter; advances only on real locale changes.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Switch the active locale and notify subscribers.
    ///
    /// Switching to the locale that is already active is a no-op: no
    /// notification fires and the version does not advance.
    pub fn set_locale(&self, code: impl Into<Locale>) {
        let code = normalize_locale(code.into());
        let mut inner = self.lock();
        if inner.current == code {
            return;
        }
        inner.current = code.clone();
        inner.version += 1;
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(code.clone()).is_ok());
        tracing::debug!(locale = %code, version = inner.version, "switched active locale");
    }

    /// Open a change-notification stream; fires after each successful switch.
    #[must_use]
    pub fn subscribe_changes(&self) -> mpsc::Receiver<Locale> {
        let (sender, receiver) = mpsc::channel();
        self.lock().subscribers.push(sender);
        receiver
    }

    /// Full dictionary for a locale, replaced wholesale by callers.
    ///
    /// A regional variant with no dictionary of its own falls back to its
    /// base language (`"fr-CA"` → `"fr"`); an unknown locale yields an
    /// empty dictionary.
    #[must_use]
    pub fn dictionary(&self, locale: &str) -> TranslationDictionary {
        let inner = self.lock();
        if let Some(dictionary) = inner.dictionaries.get(locale) {
            return dictionary.clone();
        }
        if let Some(base) = locale.split('-').next()
            && let Some(dictionary) = inner.dictionaries.get(base)
        {
            return dictionary.clone();
        }
        tracing::warn!(locale, "no dictionary for locale");
        TranslationDictionary::new()
    }

    /// The language catalog.
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        self.lock().languages.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LocaleInner> {
        self.inner.lock().expect("locale service lock poisoned")
    }
}

/// Detect the system locale from environment variables.
///
/// Preference order: `LC_ALL`, then `LANG`. Falls back to `"en"`.
#[must_use]
pub fn detect_system_locale() -> Locale {
    let lc_all = env::var("LC_ALL").ok();
    let lang = env::var("LANG").ok();
    detect_locale_from(lc_all.as_deref(), lang.as_deref())
}

fn detect_locale_from(lc_all: Option<&str>, lang: Option<&str>) -> Locale {
    lc_all
        .and_then(normalize_raw)
        .or_else(|| lang.and_then(normalize_raw))
        .unwrap_or_else(|| "en".to_string())
}

fn normalize_locale(raw: Locale) -> Locale {
    normalize_raw(&raw).unwrap_or_else(|| "en".to_string())
}

/// Strip codeset/modifier suffixes and canonicalize separators.
///
/// `en_US.UTF-8@latin` becomes `en-US`; `C` and `POSIX` become `en`.
fn normalize_raw(raw: &str) -> Option<Locale> {
    let raw = raw.trim();
    let raw = raw.split(['@', '.']).next().unwrap_or(raw).trim();
    if raw.is_empty() {
        return None;
    }
    if raw.eq_ignore_ascii_case("c") || raw.eq_ignore_ascii_case("posix") {
        return Some("en".to_string());
    }
    Some(raw.replace('_', "-"))
}
