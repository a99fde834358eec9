#![forbid(unsafe_code)]

//! Profile entity and typed route-payload extraction.
//!
//! The profile is resolved once per navigation: the router attaches a
//! [`RouteEnvelope`] to the navigation event and the screen extracts a
//! typed [`Profile`] from it. Extraction is a plain serde decode returning
//! `Result`, not a reflective helper; a malformed payload is a
//! [`DecodeError`] the screen can log and survive.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// The profile entity shown by the screen.
///
/// Immutable after assignment until the next navigation. `is_shell` marks a
/// placeholder payload used for the loading visual mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_shell: bool,
}

/// Screen-side profile slot with the derived shell flag.
///
/// `is_shell` is recomputed on every replacement: `true` while no profile
/// has resolved, otherwise the profile's own flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileState {
    profile: Option<Profile>,
    is_shell: bool,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            profile: None,
            is_shell: true,
        }
    }
}

impl ProfileState {
    /// Replace the profile and recompute the shell flag.
    pub fn set_profile(&mut self, profile: Option<Profile>) {
        self.is_shell = profile.as_ref().is_none_or(|p| p.is_shell);
        self.profile = profile;
    }

    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn is_shell(&self) -> bool {
        self.is_shell
    }
}

/// Payload attached to a navigation event.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEnvelope {
    data: Record,
}

impl RouteEnvelope {
    /// Wrap a navigation payload.
    #[must_use]
    pub fn new(data: Record) -> Self {
        Self { data }
    }

    /// Decode the payload into a typed value.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        if self.data.is_null() {
            return Err(DecodeError::MissingPayload);
        }
        serde_json::from_value(self.data.clone()).map_err(DecodeError::Payload)
    }
}

/// Failure to extract a typed payload from a route envelope.
#[derive(Debug)]
pub enum DecodeError {
    /// The envelope carried no payload at all.
    MissingPayload,
    /// The payload did not match the target shape.
    Payload(serde_json::Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingPayload => write!(f, "route envelope carried no payload"),
            DecodeError::Payload(e) => write!(f, "route payload decode failed: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::MissingPayload => None,
            DecodeError::Payload(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::Payload(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_profile() -> Record {
        json!({
            "id": "u-42",
            "display_name": "Imani",
            "bio": "Potter and organizer",
            "is_shell": false,
        })
    }

    #[test]
    fn extract_decodes_a_well_formed_profile() {
        let envelope = RouteEnvelope::new(sample_profile());
        let profile: Profile = envelope.extract().unwrap();
        assert_eq!(profile.id, "u-42");
        assert_eq!(profile.display_name, "Imani");
        assert!(!profile.is_shell);
    }

    #[test]
    fn extract_defaults_optional_fields() {
        let envelope = RouteEnvelope::new(json!({"id": "u-1", "display_name": "Ade"}));
        let profile: Profile = envelope.extract().unwrap();
        assert_eq!(profile.bio, None);
        assert_eq!(profile.avatar_url, None);
        assert!(!profile.is_shell);
    }

    #[test]
    fn extract_rejects_a_null_payload() {
        let envelope = RouteEnvelope::new(Record::Null);
        let err = envelope.extract::<Profile>().unwrap_err();
        assert!(matches!(err, DecodeError::MissingPayload));
    }

    #[test]
    fn extract_rejects_a_malformed_payload() {
        let envelope = RouteEnvelope::new(json!({"id": 7}));
        let err = envelope.extract::<Profile>().unwrap_err();
        assert!(matches!(err, DecodeError::Payload(_)));
    }

    #[test]
    fn profile_state_starts_as_shell() {
        let state = ProfileState::default();
        assert!(state.is_shell());
        assert!(state.profile().is_none());
    }

    #[test]
    fn shell_flag_follows_the_assigned_profile() {
        let mut state = ProfileState::default();

        let mut profile: Profile =
            serde_json::from_value(sample_profile()).unwrap();
        state.set_profile(Some(profile.clone()));
        assert!(!state.is_shell());

        profile.is_shell = true;
        state.set_profile(Some(profile));
        assert!(state.is_shell());

        state.set_profile(None);
        assert!(state.is_shell());
    }
}
