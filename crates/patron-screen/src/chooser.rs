#![forbid(unsafe_code)]

//! Language chooser dialog building.
//!
//! The chooser is a modal presented by an injected [`DialogPresenter`]: a
//! header, one radio-style input per catalog language, and Cancel/Confirm
//! buttons. The option list is projected fresh each time the chooser opens,
//! with exactly one option checked when the catalog contains the current
//! locale.

use std::fmt;

use patron_core::Language;

/// One radio-style input of the chooser, projected from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    pub label: String,
    pub value: String,
    pub checked: bool,
}

/// Project the language catalog into chooser options.
///
/// `checked` is true only for the option whose code equals the current
/// locale; when no catalog entry matches, no option is checked.
#[must_use]
pub fn language_options(catalog: &[Language], current: &str) -> Vec<LanguageOption> {
    catalog
        .iter()
        .map(|language| LanguageOption {
            label: language.name.clone(),
            value: language.code.clone(),
            checked: language.code == current,
        })
        .collect()
}

/// Role of a dialog button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    Cancel,
    Confirm,
}

/// A dialog button with its localized label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogButton {
    pub label: String,
    pub role: ButtonRole,
}

/// Everything the presenter needs to render the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogConfig {
    pub header: String,
    pub inputs: Vec<LanguageOption>,
    pub buttons: Vec<DialogButton>,
}

/// The user's interaction with the presented modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Confirm pressed; carries the selected radio value, if any.
    Confirmed(Option<String>),
    /// Cancel pressed or the modal dismissed.
    Cancelled,
}

/// Capability for presenting a modal dialog and reporting the outcome.
pub trait DialogPresenter {
    fn present(&self, config: DialogConfig) -> DialogOutcome;
}

/// Why the chooser could not be opened.
#[derive(Debug, PartialEq, Eq)]
pub enum ChooserError {
    /// No translation refresh has completed yet; the dialog text would be
    /// undefined, so the action is disabled until the dictionary loads.
    TranslationsNotReady,
}

impl fmt::Display for ChooserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChooserError::TranslationsNotReady => {
                write!(f, "translations not loaded yet; language chooser unavailable")
            }
        }
    }
}

impl std::error::Error for ChooserError {}

/// Presenter double that records every presented config and replies with a
/// scripted outcome.
pub struct ScriptedPresenter {
    outcome: DialogOutcome,
    presented: std::sync::Mutex<Vec<DialogConfig>>,
}

impl ScriptedPresenter {
    #[must_use]
    pub fn new(outcome: DialogOutcome) -> Self {
        Self {
            outcome,
            presented: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every config presented so far, in order.
    #[must_use]
    pub fn presented(&self) -> Vec<DialogConfig> {
        self.presented
            .lock()
            .expect("presenter lock poisoned")
            .clone()
    }
}

impl DialogPresenter for ScriptedPresenter {
    fn present(&self, config: DialogConfig) -> DialogOutcome {
        self.presented
            .lock()
            .expect("presenter lock poisoned")
            .push(config);
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog() -> Vec<Language> {
        vec![Language::new("EN", "en"), Language::new("FR", "fr")]
    }

    #[test]
    fn exactly_one_option_checked_for_the_current_locale() {
        let options = language_options(&catalog(), "fr");
        let checked: Vec<_> = options.iter().filter(|o| o.checked).collect();
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].value, "fr");
        assert_eq!(checked[0].label, "FR");
    }

    #[test]
    fn no_option_checked_when_locale_not_in_catalog() {
        let options = language_options(&catalog(), "de");
        assert!(options.iter().all(|o| !o.checked));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn projection_preserves_catalog_order() {
        let options = language_options(&catalog(), "en");
        let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["en", "fr"]);
    }

    #[test]
    fn scripted_presenter_records_configs() {
        let presenter = ScriptedPresenter::new(DialogOutcome::Cancelled);
        let config = DialogConfig {
            header: "Select language".to_string(),
            inputs: language_options(&catalog(), "en"),
            buttons: vec![
                DialogButton {
                    label: "Cancel".to_string(),
                    role: ButtonRole::Cancel,
                },
                DialogButton {
                    label: "OK".to_string(),
                    role: ButtonRole::Confirm,
                },
            ],
        };

        assert_eq!(presenter.present(config.clone()), DialogOutcome::Cancelled);
        assert_eq!(presenter.presented(), vec![config]);
    }

    proptest! {
        #[test]
        fn at_most_one_option_is_checked(
            codes in proptest::collection::hash_set("[a-z]{2}", 0..8),
            current in "[a-z]{2}",
        ) {
            let catalog: Vec<Language> = codes
                .iter()
                .map(|code| Language::new(code.to_uppercase(), code.clone()))
                .collect();
            let options = language_options(&catalog, &current);
            let checked = options.iter().filter(|o| o.checked).count();
            prop_assert!(checked <= 1);
            prop_assert_eq!(checked == 1, codes.contains(&current));
        }

        #[test]
        fn projection_is_a_faithful_relabeling(
            codes in proptest::collection::vec("[a-z]{2,3}", 0..8),
        ) {
            let catalog: Vec<Language> = codes
                .iter()
                .map(|code| Language::new(code.to_uppercase(), code.clone()))
                .collect();
            let options = language_options(&catalog, "en");
            prop_assert_eq!(options.len(), catalog.len());
            for (option, language) in options.iter().zip(&catalog) {
                prop_assert_eq!(&option.value, &language.code);
                prop_assert_eq!(&option.label, &language.name);
            }
        }
    }
}
