use std::sync::Arc;

use anyhow::Result;

use crate::core::interfaces::adapters::{
    SpeechCallbacks, SpeechOptions, SpeechSynthesizer, StateStore, VisionAnalyzer,
};
use crate::core::models::{
    resolve_credential, AnalysisResult, CaptureBuffer, CaptureHistory, Credential,
    CredentialResolution, HistoryEntry,
};
use crate::global_constants;

/// Owns one capture-analyze-narrate session: the current result, the
/// loading/error flags, and the bounded history, plus its persistence.
///
/// All mutation is single-threaded; the only suspension point is the network
/// call inside the analyzer. Each capture gets a monotonic sequence token and
/// only the latest begun capture may commit or fail the session, so a slow
/// superseded call cannot overwrite a newer result.
pub struct SessionOrchestrator {
    analyzer: Arc<dyn VisionAnalyzer>,
    speech: Arc<dyn SpeechSynthesizer>,
    store: Arc<dyn StateStore>,
    current_image: Option<CaptureBuffer>,
    current_result: Option<AnalysisResult>,
    is_loading: bool,
    error: Option<String>,
    history: CaptureHistory,
    capture_seq: u64,
}

impl SessionOrchestrator {
    pub fn build(
        analyzer: Arc<dyn VisionAnalyzer>,
        speech: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        let history = Self::rehydrate_history(store.as_ref());

        Self {
            analyzer,
            speech,
            store,
            current_image: None,
            current_result: None,
            is_loading: false,
            error: None,
            history,
            capture_seq: 0,
        }
    }

    /// Stored history that fails to load or parse is treated as empty, never
    /// surfaced as an error.
    fn rehydrate_history(store: &dyn StateStore) -> CaptureHistory {
        let bytes = match store.load(global_constants::HISTORY_STORAGE_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return CaptureHistory::default(),
            Err(error) => {
                log::warn!("[SESSION] Failed to read stored history: {}", error);
                return CaptureHistory::default();
            }
        };

        match serde_json::from_slice::<CaptureHistory>(&bytes) {
            Ok(history) => {
                log::info!("[SESSION] Rehydrated {} history entries", history.len());
                history
            }
            Err(error) => {
                log::warn!(
                    "[SESSION] Discarding malformed stored history: {}",
                    error
                );
                CaptureHistory::default()
            }
        }
    }

    /// Resolves the startup credential: an environment-provided key wins over
    /// a stored one, and seeds the store when the store was empty. Returns
    /// whether a credential ended up installed.
    pub fn bootstrap_credential(&mut self, env_value: Option<String>) -> bool {
        let stored_value = match self.store.load(global_constants::CREDENTIAL_STORAGE_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<String>(&bytes) {
                Ok(value) => Some(value),
                Err(error) => {
                    log::warn!("[SESSION] Discarding malformed stored credential: {}", error);
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                log::warn!("[SESSION] Failed to read stored credential: {}", error);
                None
            }
        };

        let (credential, resolution) =
            resolve_credential(env_value.as_deref(), stored_value.as_deref());

        let Some(credential) = credential else {
            log::info!("[SESSION] No credential available, capture disabled until one is set");
            return false;
        };

        if matches!(
            resolution,
            CredentialResolution::FromEnvironment { persist: true }
        ) {
            if let Err(error) = self.persist_credential(&credential) {
                log::warn!("[SESSION] Failed to persist environment credential: {}", error);
            }
        }

        log::info!("[SESSION] Credential installed ({:?})", resolution);
        self.analyzer.install_credential(credential);
        true
    }

    /// Installs a user-supplied key, replacing any previous one, and persists
    /// it for later runs.
    pub fn install_credential(&mut self, key: &str) -> Result<()> {
        let credential =
            Credential::new(key).ok_or_else(|| anyhow::anyhow!("API key is required"))?;

        self.persist_credential(&credential)?;
        self.analyzer.install_credential(credential);

        log::info!("[SESSION] New credential installed");
        Ok(())
    }

    /// The store holds JSON documents, so the key is written as a JSON string
    /// rather than raw bytes.
    fn persist_credential(&self, credential: &Credential) -> Result<()> {
        let encoded = serde_json::to_vec(credential.as_str())?;
        self.store
            .save(global_constants::CREDENTIAL_STORAGE_KEY, &encoded)?;
        Ok(())
    }

    pub fn has_credential(&self) -> bool {
        self.analyzer.is_initialized()
    }

    /// Runs one full capture cycle against the analyzer. The session ends up
    /// either with a new current result or with an error message set.
    pub async fn capture_and_analyze(&mut self, image: CaptureBuffer) {
        let seq = self.begin_capture().await;
        let outcome = self.analyzer.analyze(&image).await;

        match outcome {
            Ok(result) => self.complete_capture(seq, image, result),
            Err(error) => self.fail_capture(seq, error.to_string()),
        }
    }

    /// Clears any previous error, flags loading, and silences speech. The
    /// returned token must accompany the matching complete/fail call.
    pub async fn begin_capture(&mut self) -> u64 {
        self.error = None;
        self.is_loading = true;
        self.speech.stop().await;

        self.capture_seq += 1;
        log::info!("[SESSION] Capture {} started", self.capture_seq);
        self.capture_seq
    }

    pub fn complete_capture(&mut self, seq: u64, image: CaptureBuffer, result: AnalysisResult) {
        if seq != self.capture_seq {
            log::warn!(
                "[SESSION] Discarding stale result from capture {} (latest is {})",
                seq,
                self.capture_seq
            );
            return;
        }

        self.is_loading = false;
        self.current_image = Some(image.clone());
        self.current_result = Some(result.clone());

        self.history.prepend(HistoryEntry::build_now(image, result));
        self.persist_history();

        log::info!(
            "[SESSION] Capture {} complete, history now holds {} entries",
            seq,
            self.history.len()
        );
    }

    pub fn fail_capture(&mut self, seq: u64, message: String) {
        if seq != self.capture_seq {
            log::warn!(
                "[SESSION] Discarding stale failure from capture {} (latest is {})",
                seq,
                self.capture_seq
            );
            return;
        }

        log::error!("[SESSION] Capture {} failed: {}", seq, message);
        self.is_loading = false;
        self.error = Some(message);
    }

    /// Replaces the current image/result with a past entry. No re-analysis.
    pub async fn select_history_entry(&mut self, index: usize) -> bool {
        let Some(entry) = self.history.get(index).cloned() else {
            return false;
        };

        self.speech.stop().await;
        self.current_image = Some(entry.image);
        self.current_result = Some(entry.result);
        self.error = None;

        log::info!("[SESSION] Selected history entry {}", index);
        true
    }

    pub fn clear_history(&mut self) {
        self.history.clear();

        if let Err(error) = self.store.remove(global_constants::HISTORY_STORAGE_KEY) {
            log::warn!("[SESSION] Failed to remove persisted history: {}", error);
        }

        log::info!("[SESSION] History cleared");
    }

    /// Reads the current result aloud. Stops any previous utterance first.
    pub async fn speak_current(&mut self, callbacks: SpeechCallbacks) -> Result<()> {
        let Some(result) = &self.current_result else {
            anyhow::bail!("Nothing to speak yet - analyze an image first");
        };

        let narration = result.narration_text();
        self.speech.stop().await;
        self.speech
            .speak(&narration, SpeechOptions::default(), callbacks)
            .await
    }

    pub async fn stop_speaking(&self) {
        self.speech.stop().await;
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.is_speaking()
    }

    fn persist_history(&self) {
        let bytes = match serde_json::to_vec_pretty(&self.history) {
            Ok(bytes) => bytes,
            Err(error) => {
                log::warn!("[SESSION] Failed to serialize history: {}", error);
                return;
            }
        };

        if let Err(error) = self
            .store
            .save(global_constants::HISTORY_STORAGE_KEY, &bytes)
        {
            log::warn!("[SESSION] Failed to persist history: {}", error);
        }
    }

    pub fn current_result(&self) -> Option<&AnalysisResult> {
        self.current_result.as_ref()
    }

    #[allow(dead_code)]
    pub fn current_image(&self) -> Option<&CaptureBuffer> {
        self.current_image.as_ref()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn history(&self) -> &CaptureHistory {
        &self.history
    }
}
