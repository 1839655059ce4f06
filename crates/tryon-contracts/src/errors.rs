use thiserror::Error;

/// User-facing message for a rejected credential (HTTP 403 or an empty
/// key on the connectivity test).
pub const INVALID_CREDENTIAL_MESSAGE: &str =
    "API key is invalid. Verify the key in Google AI Studio.";

pub const MODEL_NOT_FOUND_MESSAGE: &str = "Model not found. Verify the API key and endpoint.";

pub const MISSING_CREDENTIAL_MESSAGE: &str = "Enter an API key first.";

pub const MISSING_IMAGES_MESSAGE: &str = "Upload both images before generating.";

pub const NON_IMAGE_DROP_MESSAGE: &str = "Dropped file is not an image.";

/// Everything that can go wrong between a user action and a rendered
/// result. Each variant's `Display` form is the single message shown to
/// the user; nothing here propagates past the session boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryOnError {
    /// Bad local input: non-image drop, missing credential or images.
    #[error("{0}")]
    Validation(String),

    /// A catalog garment could not be fetched or decoded.
    #[error("Failed to load the garment image: {0}")]
    CatalogLoad(String),

    /// The provider rejected the credential.
    #[error("{0}")]
    Auth(String),

    /// Non-2xx provider response or a provider-reported error body.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    /// Transport-level failure with no response at all.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body missing the candidates/content/parts structure.
    #[error("Unexpected response format: {0}")]
    MalformedResponse(String),

    /// The model answered with text instead of an image.
    #[error("{0}")]
    UnsupportedModelResponse(String),

    /// A well-formed response carrying neither image nor text parts.
    #[error("The response contains no image data.")]
    EmptyResponse,

    /// A builder was invoked without its inputs; callers check first.
    #[error("{0}")]
    Precondition(String),
}

impl TryOnError {
    /// Stable category label used in the session event log.
    pub fn kind(&self) -> &'static str {
        match self {
            TryOnError::Validation(_) => "validation",
            TryOnError::CatalogLoad(_) => "catalog_load",
            TryOnError::Auth(_) => "auth",
            TryOnError::Api { .. } => "api",
            TryOnError::Network(_) => "network",
            TryOnError::MalformedResponse(_) => "malformed_response",
            TryOnError::UnsupportedModelResponse(_) => "unsupported_model_response",
            TryOnError::EmptyResponse => "empty_response",
            TryOnError::Precondition(_) => "precondition",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_user_visible_message() {
        let err = TryOnError::Auth(INVALID_CREDENTIAL_MESSAGE.to_string());
        assert_eq!(
            err.to_string(),
            "API key is invalid. Verify the key in Google AI Studio."
        );

        let err = TryOnError::Api {
            status: Some(404),
            message: MODEL_NOT_FOUND_MESSAGE.to_string(),
        };
        assert_eq!(err.to_string(), "Model not found. Verify the API key and endpoint.");

        let err = TryOnError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn kind_labels_are_stable() {
        assert_eq!(TryOnError::EmptyResponse.kind(), "empty_response");
        assert_eq!(
            TryOnError::CatalogLoad("missing".to_string()).kind(),
            "catalog_load"
        );
    }
}
