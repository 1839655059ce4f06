use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::assets::{AssetSlot, ImageAsset};
use crate::errors::{MISSING_CREDENTIAL_MESSAGE, MISSING_IMAGES_MESSAGE};

/// Lifecycle of the generation pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// A generated composite image as the provider returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub image_data: String,
    pub mime_type: String,
}

impl GenerationResult {
    pub fn decoded_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(BASE64.decode(self.image_data.as_bytes())?)
    }
}

/// Everything a session holds between user actions. Transitions go
/// through [`reduce`], which returns a fresh value; callers never mutate
/// a state in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub credential: String,
    pub person: Option<ImageAsset>,
    pub garment: Option<ImageAsset>,
    pub selected_garment: Option<String>,
    pub result: Option<GenerationResult>,
    pub phase: Phase,
    pub error: Option<String>,
    pub success: Option<String>,
    pub model_listing: Option<Vec<String>>,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Whether the generate affordance is enabled: credential present,
    /// both images present, no submission in flight.
    pub fn can_submit(&self) -> bool {
        !self.credential.trim().is_empty()
            && self.person.is_some()
            && self.garment.is_some()
            && !self.is_loading()
    }

    /// The validation message a submit attempt would fail with right
    /// now, or `None` when preconditions are met. Credential is checked
    /// before the images, matching the order the user fills them in.
    pub fn submit_block_reason(&self) -> Option<String> {
        if self.credential.trim().is_empty() {
            return Some(MISSING_CREDENTIAL_MESSAGE.to_string());
        }
        if self.person.is_none() || self.garment.is_none() {
            return Some(MISSING_IMAGES_MESSAGE.to_string());
        }
        None
    }

    pub fn asset(&self, slot: AssetSlot) -> Option<&ImageAsset> {
        match slot {
            AssetSlot::Person => self.person.as_ref(),
            AssetSlot::Garment => self.garment.as_ref(),
        }
    }
}

/// One observed fact about the session. Applying an event via [`reduce`]
/// is the only way state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CredentialEdited(String),
    AssetLoaded { slot: AssetSlot, asset: ImageAsset },
    GarmentPicked { filename: String, asset: ImageAsset },
    AssetCleared(AssetSlot),
    /// A local load was refused (non-image drop, catalog failure);
    /// already-loaded assets stay untouched.
    LoadRejected(String),
    /// Submit preconditions failed; no request was issued and the prior
    /// result is preserved.
    SubmitRejected(String),
    SubmitStarted,
    GenerationSucceeded(GenerationResult),
    GenerationFailed(String),
    ModelsRequested,
    ModelsListed(Vec<String>),
    ModelsFailed(String),
}

pub const GENERATION_SUCCESS_MESSAGE: &str = "Image generation completed.";

/// Pure transition function. While a submission is in flight the error
/// and success notices are always absent; after it resolves exactly one
/// of error or success is set.
pub fn reduce(state: &SessionState, event: SessionEvent) -> SessionState {
    let mut next = state.clone();
    match event {
        SessionEvent::CredentialEdited(credential) => {
            next.credential = credential;
        }
        SessionEvent::AssetLoaded { slot, asset } => match slot {
            AssetSlot::Person => next.person = Some(asset),
            AssetSlot::Garment => next.garment = Some(asset),
        },
        SessionEvent::GarmentPicked { filename, asset } => {
            next.garment = Some(asset);
            next.selected_garment = Some(filename);
        }
        SessionEvent::AssetCleared(slot) => match slot {
            AssetSlot::Person => next.person = None,
            AssetSlot::Garment => {
                next.garment = None;
                next.selected_garment = None;
            }
        },
        SessionEvent::LoadRejected(message) => {
            next.error = Some(message);
            next.success = None;
        }
        SessionEvent::SubmitRejected(message) => {
            next.phase = Phase::Failed;
            next.error = Some(message);
            next.success = None;
        }
        SessionEvent::SubmitStarted => {
            next.phase = Phase::Loading;
            next.error = None;
            next.success = None;
            next.result = None;
        }
        SessionEvent::GenerationSucceeded(result) => {
            next.phase = Phase::Succeeded;
            next.result = Some(result);
            next.success = Some(GENERATION_SUCCESS_MESSAGE.to_string());
            next.error = None;
        }
        SessionEvent::GenerationFailed(message) => {
            next.phase = Phase::Failed;
            next.error = Some(message);
            next.success = None;
            next.result = None;
        }
        SessionEvent::ModelsRequested => {
            next.phase = Phase::Loading;
            next.error = None;
            next.success = None;
            next.model_listing = None;
        }
        SessionEvent::ModelsListed(models) => {
            next.phase = Phase::Idle;
            next.model_listing = Some(models);
        }
        SessionEvent::ModelsFailed(message) => {
            next.phase = Phase::Failed;
            next.error = Some(message);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use crate::assets::AssetSource;
    use crate::errors::{MISSING_CREDENTIAL_MESSAGE, MISSING_IMAGES_MESSAGE};

    use super::*;

    fn asset() -> ImageAsset {
        ImageAsset::new(vec![1, 2, 3], "image/png", AssetSource::Upload)
    }

    fn ready_state() -> SessionState {
        let state = SessionState {
            credential: "key".to_string(),
            ..SessionState::default()
        };
        let state = reduce(
            &state,
            SessionEvent::AssetLoaded {
                slot: AssetSlot::Person,
                asset: asset(),
            },
        );
        reduce(
            &state,
            SessionEvent::AssetLoaded {
                slot: AssetSlot::Garment,
                asset: asset(),
            },
        )
    }

    #[test]
    fn submit_block_reason_checks_credential_first() {
        let state = SessionState::default();
        assert_eq!(
            state.submit_block_reason().as_deref(),
            Some(MISSING_CREDENTIAL_MESSAGE)
        );

        let state = SessionState {
            credential: "key".to_string(),
            ..SessionState::default()
        };
        assert_eq!(
            state.submit_block_reason().as_deref(),
            Some(MISSING_IMAGES_MESSAGE)
        );

        assert!(ready_state().submit_block_reason().is_none());
        assert!(ready_state().can_submit());
    }

    #[test]
    fn submit_started_clears_prior_outcome() {
        let failed = reduce(
            &ready_state(),
            SessionEvent::GenerationFailed("boom".to_string()),
        );
        assert_eq!(failed.phase, Phase::Failed);
        assert!(failed.error.is_some());

        let loading = reduce(&failed, SessionEvent::SubmitStarted);
        assert_eq!(loading.phase, Phase::Loading);
        assert!(loading.error.is_none());
        assert!(loading.success.is_none());
        assert!(loading.result.is_none());
        assert!(!loading.can_submit());
    }

    #[test]
    fn loading_never_shows_error_or_success() {
        let succeeded = reduce(
            &ready_state(),
            SessionEvent::GenerationSucceeded(GenerationResult {
                image_data: "QQ==".to_string(),
                mime_type: "image/png".to_string(),
            }),
        );
        assert_eq!(succeeded.success.as_deref(), Some(GENERATION_SUCCESS_MESSAGE));

        let loading = reduce(&succeeded, SessionEvent::SubmitStarted);
        assert!(loading.error.is_none() && loading.success.is_none());
    }

    #[test]
    fn clearing_garment_also_drops_catalog_selection() {
        let picked = reduce(
            &ready_state(),
            SessionEvent::GarmentPicked {
                filename: "a.webp".to_string(),
                asset: asset(),
            },
        );
        assert_eq!(picked.selected_garment.as_deref(), Some("a.webp"));

        let cleared = reduce(&picked, SessionEvent::AssetCleared(AssetSlot::Garment));
        assert!(cleared.garment.is_none());
        assert!(cleared.selected_garment.is_none());

        let person_cleared = reduce(&picked, SessionEvent::AssetCleared(AssetSlot::Person));
        assert!(person_cleared.person.is_none());
        assert_eq!(person_cleared.selected_garment.as_deref(), Some("a.webp"));
    }

    #[test]
    fn load_rejection_keeps_existing_assets() {
        let state = ready_state();
        let rejected = reduce(&state, SessionEvent::LoadRejected("not an image".to_string()));
        assert_eq!(rejected.error.as_deref(), Some("not an image"));
        assert!(rejected.person.is_some());
        assert!(rejected.garment.is_some());
        assert_eq!(rejected.phase, state.phase);
    }

    #[test]
    fn generation_failure_drops_prior_result() {
        let succeeded = reduce(
            &ready_state(),
            SessionEvent::GenerationSucceeded(GenerationResult {
                image_data: "QQ==".to_string(),
                mime_type: "image/jpeg".to_string(),
            }),
        );
        let restarted = reduce(&succeeded, SessionEvent::SubmitStarted);
        let failed = reduce(&restarted, SessionEvent::GenerationFailed("403".to_string()));
        assert!(failed.result.is_none());
        assert!(failed.success.is_none());
        assert_eq!(failed.error.as_deref(), Some("403"));
    }

    #[test]
    fn model_listing_flow_resets_prior_listing() {
        let state = reduce(&ready_state(), SessionEvent::ModelsRequested);
        assert_eq!(state.phase, Phase::Loading);
        assert!(state.model_listing.is_none());

        let listed = reduce(
            &state,
            SessionEvent::ModelsListed(vec!["models/a".to_string()]),
        );
        assert_eq!(listed.phase, Phase::Idle);
        assert_eq!(
            listed.model_listing.as_deref(),
            Some(&["models/a".to_string()][..])
        );
    }

    #[test]
    fn decoded_bytes_round_trips_base64() {
        let result = GenerationResult {
            image_data: "QQ==".to_string(),
            mime_type: "image/png".to_string(),
        };
        assert_eq!(result.decoded_bytes().unwrap(), vec![0x41]);
    }
}
