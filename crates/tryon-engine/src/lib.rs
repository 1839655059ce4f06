use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use image::ImageFormat;
use reqwest::blocking::Client as HttpClient;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tryon_contracts::assets::{AssetSlot, AssetSource, ImageAsset};
use tryon_contracts::catalog::{GarmentCatalog, GarmentCatalogEntry};
use tryon_contracts::errors::{
    TryOnError, INVALID_CREDENTIAL_MESSAGE, MISSING_CREDENTIAL_MESSAGE, MODEL_NOT_FOUND_MESSAGE,
    NON_IMAGE_DROP_MESSAGE,
};
use tryon_contracts::events::{EventPayload, EventWriter};
use tryon_contracts::session::{reduce, GenerationResult, SessionEvent, SessionState};

/// The single model the composite request is issued against.
pub const TRYON_MODEL_ID: &str = "gemini-2.5-flash-image";

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Saved results use this stem; the extension follows the declared MIME.
pub const RESULT_FILE_STEM: &str = "virtual-tryon-result";

/// MIME assumed when the provider omits one on an inline image part.
pub const DEFAULT_RESULT_MIME: &str = "image/jpeg";

const REQUEST_TIMEOUT_SECONDS: u64 = 90;

const TEXT_EXCERPT_MAX_CHARS: usize = 200;

pub const INSTRUCTION_TEMPLATE: &str = "Generate a photorealistic image showing this person wearing the clothing item in the second image. CRITICAL REQUIREMENTS:\n\n1. PRESERVE COMPLETELY: The person's face, facial features, hairstyle, body proportions, pose, and background must remain EXACTLY as shown in the original photo.\n\n2. MODIFY ONLY: Replace the current clothing with the new clothing item shown in the second image.\n\n3. REALISTIC INTEGRATION: Ensure the new clothing fits naturally with proper perspective, draping, shadows, and lighting that match the original photo's conditions.\n\n4. ACCURATE REPRODUCTION: The clothing design, color, pattern, and style must exactly match the clothing item shown.\n\n5. OUTPUT: A single photorealistic image of the same person in the same setting, wearing the new clothes.\n\nDo not change anything except the clothing. The person and environment must be identical to the original.";

// ---------------------------------------------------------------------------
// ImageSource loader
// ---------------------------------------------------------------------------

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        Some("png") => Some("image/png"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        Some("bmp") => Some("image/bmp"),
        Some("tif") | Some("tiff") => Some("image/tiff"),
        Some("avif") => Some("image/avif"),
        _ => None,
    }
}

fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::Avif => Some("image/avif"),
        _ => None,
    }
}

/// File-picker path: read the file and normalize it. The picker already
/// filtered to images, so an unrecognizable payload falls back to an
/// extension-derived MIME rather than failing.
pub fn load_picked_image(path: &Path) -> Result<ImageAsset, TryOnError> {
    let bytes = fs::read(path)
        .map_err(|err| TryOnError::Validation(format!("Could not read {}: {err}", path.display())))?;
    let mime = sniff_image_mime(&bytes)
        .or_else(|| mime_for_path(path))
        .unwrap_or(DEFAULT_RESULT_MIME);
    Ok(ImageAsset::new(bytes, mime, AssetSource::Upload))
}

/// Drag-drop path: anything that does not sniff as an image is refused
/// and existing assets stay untouched.
pub fn load_dropped_image(path: &Path) -> Result<ImageAsset, TryOnError> {
    let bytes = fs::read(path)
        .map_err(|err| TryOnError::Validation(format!("Could not read {}: {err}", path.display())))?;
    let Some(mime) = sniff_image_mime(&bytes) else {
        return Err(TryOnError::Validation(NON_IMAGE_DROP_MESSAGE.to_string()));
    };
    Ok(ImageAsset::new(bytes, mime, AssetSource::DragDrop))
}

/// Catalog path: fetch the static asset, then decode exactly as the
/// upload path does. Failures surface as `CatalogLoad`.
pub fn load_catalog_garment(
    garment_dir: &Path,
    entry: &GarmentCatalogEntry,
) -> Result<ImageAsset, TryOnError> {
    let path = garment_dir.join(&entry.filename);
    let bytes = fs::read(&path)
        .map_err(|err| TryOnError::CatalogLoad(format!("{} ({err})", entry.filename)))?;
    if bytes.is_empty() {
        return Err(TryOnError::CatalogLoad(format!("{} is empty", entry.filename)));
    }
    let mime = sniff_image_mime(&bytes)
        .or_else(|| mime_for_path(&path))
        .unwrap_or("image/webp");
    Ok(ImageAsset::new(bytes, mime, AssetSource::CatalogFetch))
}

// ---------------------------------------------------------------------------
// Generation request builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl InlineImagePayload {
    fn from_asset(asset: &ImageAsset) -> Self {
        Self {
            mime_type: asset.mime_type().to_string(),
            data: asset.encoded().to_string(),
        }
    }

    fn to_part(&self) -> Value {
        json!({
            "inlineData": {
                "mimeType": self.mime_type,
                "data": self.data,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub instruction: String,
    pub person: InlineImagePayload,
    pub garment: InlineImagePayload,
    pub sampling: SamplingConfig,
}

impl GenerationRequest {
    pub fn to_payload(&self) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": self.instruction },
                    self.person.to_part(),
                    self.garment.to_part(),
                ],
            }],
            "generationConfig": {
                "temperature": self.sampling.temperature,
                "topK": self.sampling.top_k,
                "topP": self.sampling.top_p,
                "maxOutputTokens": self.sampling.max_output_tokens,
            },
        })
    }
}

/// Pure assembly of the outbound request. Callers check presence before
/// invoking; absence here is a programming error surfaced as
/// `Precondition`.
pub fn build_generation_request(
    person: Option<&ImageAsset>,
    garment: Option<&ImageAsset>,
) -> Result<GenerationRequest, TryOnError> {
    let person = person
        .ok_or_else(|| TryOnError::Precondition("person image is not loaded".to_string()))?;
    let garment = garment
        .ok_or_else(|| TryOnError::Precondition("garment image is not loaded".to_string()))?;
    Ok(GenerationRequest {
        instruction: INSTRUCTION_TEMPLATE.to_string(),
        person: InlineImagePayload::from_asset(person),
        garment: InlineImagePayload::from_asset(garment),
        sampling: SamplingConfig::default(),
    })
}

// ---------------------------------------------------------------------------
// Remote model client
// ---------------------------------------------------------------------------

/// The two provider operations the session needs. Tests substitute a
/// recording stub; production uses [`GeminiClient`].
pub trait ModelTransport {
    fn list_models(&self, credential: &str) -> Result<Vec<String>, TryOnError>;
    fn generate(&self, credential: &str, request: &GenerationRequest)
        -> Result<Value, TryOnError>;
}

pub struct GeminiClient {
    api_base: String,
    http: HttpClient,
}

impl GeminiClient {
    pub fn new() -> Self {
        let api_base = env::var("GEMINI_API_BASE")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self::with_api_base(api_base)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http: HttpClient::new(),
        }
    }

    pub fn api_key_from_env() -> Option<String> {
        non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY"))
    }

    fn models_endpoint(&self) -> String {
        format!("{}/models", self.api_base)
    }

    fn generate_endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, TRYON_MODEL_ID)
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelTransport for GeminiClient {
    fn list_models(&self, credential: &str) -> Result<Vec<String>, TryOnError> {
        if credential.trim().is_empty() {
            return Err(TryOnError::Auth(MISSING_CREDENTIAL_MESSAGE.to_string()));
        }
        let response = self
            .http
            .get(self.models_endpoint())
            .query(&[("key", credential)])
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .send()
            .map_err(|err| TryOnError::Network(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| TryOnError::Network(err.to_string()))?;
        let parsed: Option<Value> = serde_json::from_str(&body).ok();

        if !(200..300).contains(&status) {
            let message = provider_error_message(parsed.as_ref());
            return Err(match status {
                401 | 403 => TryOnError::Auth(INVALID_CREDENTIAL_MESSAGE.to_string()),
                other => TryOnError::Api {
                    status: Some(other),
                    message: format!(
                        "API error {other}: {}",
                        message.unwrap_or_else(|| "unknown error".to_string())
                    ),
                },
            });
        }

        let listing = parsed.ok_or_else(|| {
            TryOnError::MalformedResponse("model listing is not valid JSON".to_string())
        })?;
        let rows = listing
            .get("models")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                TryOnError::MalformedResponse("model listing is missing `models`".to_string())
            })?;

        Ok(rows
            .iter()
            .filter(|row| {
                row.get("supportedGenerationMethods")
                    .and_then(Value::as_array)
                    .map(|methods| {
                        methods
                            .iter()
                            .any(|method| method.as_str() == Some("generateContent"))
                    })
                    .unwrap_or(false)
            })
            .filter_map(|row| row.get("name").and_then(Value::as_str).map(str::to_string))
            .collect())
    }

    fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Value, TryOnError> {
        if credential.trim().is_empty() {
            return Err(TryOnError::Auth(MISSING_CREDENTIAL_MESSAGE.to_string()));
        }
        let response = self
            .http
            .post(self.generate_endpoint())
            .query(&[("key", credential)])
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .json(&request.to_payload())
            .send()
            .map_err(|err| TryOnError::Network(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| TryOnError::Network(err.to_string()))?;
        let parsed: Option<Value> = serde_json::from_str(&body).ok();

        if !(200..300).contains(&status) {
            return Err(generate_error_for_status(status, parsed.as_ref()));
        }

        parsed.ok_or_else(|| {
            TryOnError::MalformedResponse("provider returned invalid JSON".to_string())
        })
    }
}

fn provider_error_message(body: Option<&Value>) -> Option<String> {
    body?
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Status-code translation for the generation endpoint. The 403/404/400
/// wordings are load-bearing; the UI shows them verbatim.
pub fn generate_error_for_status(status: u16, body: Option<&Value>) -> TryOnError {
    let message = provider_error_message(body);
    match status {
        403 => TryOnError::Auth(INVALID_CREDENTIAL_MESSAGE.to_string()),
        404 => TryOnError::Api {
            status: Some(404),
            message: MODEL_NOT_FOUND_MESSAGE.to_string(),
        },
        400 => TryOnError::Api {
            status: Some(400),
            message: format!(
                "Request error: {}",
                message.unwrap_or_else(|| "malformed request payload".to_string())
            ),
        },
        other => TryOnError::Api {
            status: Some(other),
            message: format!(
                "API error {other}: {}",
                message.unwrap_or_else(|| "unknown error".to_string())
            ),
        },
    }
}

// ---------------------------------------------------------------------------
// Response interpreter
// ---------------------------------------------------------------------------

struct InlinePartKeys {
    container: &'static str,
    mime: &'static str,
    data: &'static str,
}

/// The provider has shipped both camelCase and snake_case spellings of
/// the inline-image part; both are tried in this order.
const INLINE_PART_STRATEGIES: &[InlinePartKeys] = &[
    InlinePartKeys {
        container: "inlineData",
        mime: "mimeType",
        data: "data",
    },
    InlinePartKeys {
        container: "inline_data",
        mime: "mime_type",
        data: "data",
    },
];

/// Locate the generated image in a raw provider response. Ordered,
/// first match wins; a top-level `error` always beats image extraction.
pub fn interpret_generation_response(payload: &Value) -> Result<GenerationResult, TryOnError> {
    if let Some(error) = payload.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("The provider reported an error.")
            .to_string();
        return Err(TryOnError::Api {
            status: None,
            message,
        });
    }

    let parts = payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            TryOnError::MalformedResponse("missing candidates/content/parts".to_string())
        })?;

    for part in parts {
        for keys in INLINE_PART_STRATEGIES {
            let Some(inline) = part.get(keys.container).and_then(Value::as_object) else {
                continue;
            };
            let Some(data) = inline.get(keys.data).and_then(Value::as_str) else {
                continue;
            };
            if data.is_empty() {
                continue;
            }
            let mime_type = inline
                .get(keys.mime)
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_RESULT_MIME)
                .to_string();
            return Ok(GenerationResult {
                image_data: data.to_string(),
                mime_type,
            });
        }
    }

    for part in parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            return Err(TryOnError::UnsupportedModelResponse(format!(
                "This model does not support image generation. Text response: {}",
                truncate_text(text, TEXT_EXCERPT_MAX_CHARS)
            )));
        }
    }

    Err(TryOnError::EmptyResponse)
}

// ---------------------------------------------------------------------------
// Session engine
// ---------------------------------------------------------------------------

/// Drives the session state machine: loads assets, issues the
/// generation request, interprets the response, and folds every outcome
/// back into [`SessionState`]. Domain failures never escape; they end up
/// as the state's user-visible message.
pub struct SessionEngine {
    state: SessionState,
    transport: Box<dyn ModelTransport>,
    catalog: GarmentCatalog,
    garment_dir: PathBuf,
    events: Option<EventWriter>,
    last_request_digest: Option<String>,
}

impl SessionEngine {
    pub fn new(
        transport: Box<dyn ModelTransport>,
        catalog: GarmentCatalog,
        garment_dir: impl Into<PathBuf>,
        events: Option<EventWriter>,
    ) -> Self {
        let engine = Self {
            state: SessionState::default(),
            transport,
            catalog,
            garment_dir: garment_dir.into(),
            events,
            last_request_digest: None,
        };
        engine.note(
            "session_started",
            payload(json!({
                "garment_dir": engine.garment_dir.to_string_lossy(),
                "catalog_size": engine.catalog.len(),
            })),
        );
        engine
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn catalog(&self) -> &GarmentCatalog {
        &self.catalog
    }

    pub fn garment_dir(&self) -> &Path {
        &self.garment_dir
    }

    fn apply(&mut self, event: SessionEvent) {
        self.state = reduce(&self.state, event);
    }

    /// Diagnostics only; an unwritable event log never interrupts a
    /// state transition.
    fn note(&self, event_type: &str, payload: EventPayload) {
        if let Some(events) = &self.events {
            let _ = events.emit(event_type, payload);
        }
    }

    pub fn set_credential(&mut self, credential: impl Into<String>) {
        if self.state.is_loading() {
            return;
        }
        self.apply(SessionEvent::CredentialEdited(credential.into()));
    }

    pub fn load_person(&mut self, path: &Path) {
        self.load_slot(AssetSlot::Person, load_picked_image(path));
    }

    pub fn load_garment(&mut self, path: &Path) {
        self.load_slot(AssetSlot::Garment, load_picked_image(path));
    }

    pub fn drop_file(&mut self, slot: AssetSlot, path: &Path) {
        self.load_slot(slot, load_dropped_image(path));
    }

    fn load_slot(&mut self, slot: AssetSlot, loaded: Result<ImageAsset, TryOnError>) {
        match loaded {
            Ok(asset) => {
                self.note(
                    "asset_loaded",
                    payload(json!({
                        "slot": slot.label(),
                        "source": asset.source().label(),
                        "mime_type": asset.mime_type(),
                        "bytes": asset.raw_bytes().len(),
                    })),
                );
                self.apply(SessionEvent::AssetLoaded { slot, asset });
            }
            Err(err) => {
                self.note(
                    "load_rejected",
                    payload(json!({
                        "slot": slot.label(),
                        "kind": err.kind(),
                        "message": err.to_string(),
                    })),
                );
                self.apply(SessionEvent::LoadRejected(err.to_string()));
            }
        }
    }

    pub fn pick_garment_by_index(&mut self, display_index: usize) {
        let filename = match self.catalog.by_index(display_index) {
            Some(entry) => entry.filename.clone(),
            None => {
                let err =
                    TryOnError::CatalogLoad(format!("no garment at index {display_index}"));
                self.apply(SessionEvent::LoadRejected(err.to_string()));
                return;
            }
        };
        self.pick_garment(&filename);
    }

    pub fn pick_garment(&mut self, filename: &str) {
        let Some(entry) = self.catalog.get(filename).cloned() else {
            let err = TryOnError::CatalogLoad(format!("{filename} is not in the catalog"));
            self.apply(SessionEvent::LoadRejected(err.to_string()));
            return;
        };
        match load_catalog_garment(&self.garment_dir, &entry) {
            Ok(asset) => {
                self.note(
                    "garment_selected",
                    payload(json!({
                        "filename": &entry.filename,
                        "display_index": entry.display_index,
                        "mime_type": asset.mime_type(),
                    })),
                );
                self.apply(SessionEvent::GarmentPicked {
                    filename: entry.filename,
                    asset,
                });
            }
            Err(err) => {
                self.note(
                    "load_rejected",
                    payload(json!({
                        "slot": AssetSlot::Garment.label(),
                        "kind": err.kind(),
                        "message": err.to_string(),
                    })),
                );
                self.apply(SessionEvent::LoadRejected(err.to_string()));
            }
        }
    }

    pub fn clear(&mut self, slot: AssetSlot) {
        self.note("asset_cleared", payload(json!({ "slot": slot.label() })));
        self.apply(SessionEvent::AssetCleared(slot));
    }

    /// The generate action. Preconditions are validated before anything
    /// is cleared or sent; a rejected submit provably issues no request.
    pub fn submit(&mut self) {
        if self.state.is_loading() {
            return;
        }
        if let Some(reason) = self.state.submit_block_reason() {
            self.note("generation_rejected", payload(json!({ "reason": &reason })));
            self.apply(SessionEvent::SubmitRejected(reason));
            return;
        }

        self.apply(SessionEvent::SubmitStarted);
        match self.run_generation() {
            Ok(result) => {
                self.note(
                    "generation_succeeded",
                    payload(json!({
                        "mime_type": &result.mime_type,
                        "encoded_len": result.image_data.len(),
                    })),
                );
                self.apply(SessionEvent::GenerationSucceeded(result));
            }
            Err(err) => {
                self.note(
                    "generation_failed",
                    payload(json!({
                        "kind": err.kind(),
                        "message": err.to_string(),
                    })),
                );
                self.apply(SessionEvent::GenerationFailed(err.to_string()));
            }
        }
    }

    fn run_generation(&mut self) -> Result<GenerationResult, TryOnError> {
        let request =
            build_generation_request(self.state.person.as_ref(), self.state.garment.as_ref())?;
        let outbound = request.to_payload();
        self.last_request_digest = Some(payload_digest(&outbound));
        self.note(
            "generation_requested",
            payload(json!({
                "model": TRYON_MODEL_ID,
                "request_digest": &self.last_request_digest,
            })),
        );

        let response = self.transport.generate(&self.state.credential, &request)?;
        self.note(
            "provider_status",
            payload(json!({
                "candidates": response
                    .get("candidates")
                    .and_then(Value::as_array)
                    .map(|rows| rows.len())
                    .unwrap_or(0),
                "body_preview": truncate_text(&response.to_string(), 512),
            })),
        );
        interpret_generation_response(&response)
    }

    /// The connectivity-test action: list models that support content
    /// generation, for diagnosis.
    pub fn list_models(&mut self) {
        if self.state.is_loading() {
            return;
        }
        if self.state.credential.trim().is_empty() {
            self.apply(SessionEvent::LoadRejected(
                MISSING_CREDENTIAL_MESSAGE.to_string(),
            ));
            return;
        }

        self.apply(SessionEvent::ModelsRequested);
        match self.transport.list_models(&self.state.credential) {
            Ok(models) => {
                self.note("models_listed", payload(json!({ "count": models.len() })));
                self.apply(SessionEvent::ModelsListed(models));
            }
            Err(err) => {
                self.note(
                    "models_failed",
                    payload(json!({
                        "kind": err.kind(),
                        "message": err.to_string(),
                    })),
                );
                self.apply(SessionEvent::ModelsFailed(format!(
                    "Model listing failed: {err}"
                )));
            }
        }
    }

    /// Write the generated image (and a small JSON receipt) into `dir`
    /// under the fixed result name.
    pub fn save_result(&self, dir: &Path) -> Result<PathBuf> {
        let Some(result) = self.state.result.as_ref() else {
            bail!("no generated image to save");
        };
        let bytes = result
            .decoded_bytes()
            .context("generated image payload is not valid base64")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let image_path = dir.join(format!(
            "{RESULT_FILE_STEM}.{}",
            extension_for_mime(&result.mime_type)
        ));
        fs::write(&image_path, &bytes)
            .with_context(|| format!("failed to write {}", image_path.display()))?;

        let receipt_path = dir.join(format!("{RESULT_FILE_STEM}.json"));
        let receipt = json!({
            "schema_version": 1,
            "model": TRYON_MODEL_ID,
            "mime_type": &result.mime_type,
            "bytes": bytes.len(),
            "request_digest": &self.last_request_digest,
            "session_id": self.events.as_ref().map(|events| events.session_id().to_string()),
        });
        fs::write(&receipt_path, serde_json::to_vec_pretty(&receipt)?)
            .with_context(|| format!("failed to write {}", receipt_path.display()))?;

        self.note(
            "result_saved",
            payload(json!({
                "path": image_path.to_string_lossy(),
                "bytes": bytes.len(),
            })),
        );
        Ok(image_path)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

fn payload_digest(payload: &Value) -> String {
    let bytes = serde_json::to_vec(payload).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn payload(value: Value) -> EventPayload {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}
