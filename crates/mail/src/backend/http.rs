//! HTTP client for the AI backend REST API
//!
//! Uses synchronous HTTP (ureq) moved onto the blocking pool, so callers
//! on a current-thread runtime are never stalled by a request.

use async_trait::async_trait;
use log::{debug, error, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::api::{
    ChatRequest, ChatResponse, DraftsResponse, InboxResponse, ProcessRequest, ProcessResponse,
    SaveDraftRequest, SaveDraftResponse, StatusResponse,
};
use super::{BackendError, MailBackend};
use crate::models::{Draft, DraftId, Email, PromptSet};

const INBOX_PATH: &str = "api/emails/load";
const PROCESS_PATH: &str = "api/emails/process";
const CHAT_PATH: &str = "api/chat/query";
const DRAFTS_PATH: &str = "api/drafts";
const DEFAULT_PROMPTS_PATH: &str = "api/data/default_prompts.json";

/// Backend reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
}

impl HttpBackend {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| BackendError::Network(format!("Invalid base URL {}: {}", base_url, e)))?;
        // Joining relative paths replaces the last segment unless it is a directory
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Network(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn draft_endpoint(&self, id: &DraftId) -> Result<Url, BackendError> {
        let path = format!("{}/{}", DRAFTS_PATH, urlencoding::encode(id.as_str()));
        self.endpoint(&path)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, BackendError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.endpoint(path)?;
        run_blocking(move || {
            debug!("GET {}", url);
            let mut response = ureq::get(url.as_str())
                .call()
                .map_err(|e| status_error(e, &url))?;
            Ok(response.body_mut().read_json::<T>()?)
        })
        .await
    }

    async fn post_json<B, T>(&self, path: &str, body: B) -> Result<T, BackendError>
    where
        B: Serialize + Send + 'static,
        T: DeserializeOwned + Send + 'static,
    {
        let url = self.endpoint(path)?;
        run_blocking(move || {
            debug!("POST {}", url);
            let mut response = ureq::post(url.as_str())
                .send_json(&body)
                .map_err(|e| status_error(e, &url))?;
            Ok(response.body_mut().read_json::<T>()?)
        })
        .await
    }

    async fn delete_json<T>(&self, url: Url) -> Result<T, BackendError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        run_blocking(move || {
            debug!("DELETE {}", url);
            let mut response = ureq::delete(url.as_str())
                .call()
                .map_err(|e| status_error(e, &url))?;
            Ok(response.body_mut().read_json::<T>()?)
        })
        .await
    }
}

/// Run a blocking request on the blocking pool
async fn run_blocking<T, F>(f: F) -> Result<T, BackendError>
where
    F: FnOnce() -> Result<T, BackendError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BackendError::Network(format!("Request task failed: {}", e)))?
}

fn status_error(err: ureq::Error, url: &Url) -> BackendError {
    match err {
        ureq::Error::StatusCode(404) => BackendError::NotFound(url.path().to_string()),
        other => {
            error!("Request to {} failed: {}", url, other);
            other.into()
        }
    }
}

#[async_trait]
impl MailBackend for HttpBackend {
    async fn load_inbox(&self) -> Result<Vec<Email>, BackendError> {
        let response: InboxResponse = self.get_json(INBOX_PATH).await?;
        if !response.success {
            return Err(BackendError::rejected(response.error));
        }
        if let Some(count) = response.count
            && count != response.emails.len()
        {
            warn!("Inbox reported {} emails but carried {}", count, response.emails.len());
        }
        Ok(response.emails)
    }

    async fn process_emails(&self, request: ProcessRequest) -> Result<ProcessResponse, BackendError> {
        let response: ProcessResponse = self.post_json(PROCESS_PATH, request).await?;
        // Batch-level errors flip `success` but results may still be usable
        if !response.success && response.results.is_empty() {
            let error = response.error.or_else(|| response.errors.first().cloned());
            return Err(BackendError::rejected(error));
        }
        Ok(response)
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, BackendError> {
        let response: ChatResponse = self.post_json(CHAT_PATH, request).await?;
        if !response.success {
            return Err(BackendError::rejected(response.error));
        }
        Ok(response)
    }

    async fn load_drafts(&self) -> Result<Vec<Draft>, BackendError> {
        let response: DraftsResponse = self.get_json(DRAFTS_PATH).await?;
        if !response.success {
            return Err(BackendError::rejected(response.error));
        }
        let drafts = response
            .drafts
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Draft>(value) {
                Ok(draft) => Some(draft),
                Err(e) => {
                    warn!("Skipping malformed draft: {}", e);
                    None
                }
            })
            .collect();
        Ok(drafts)
    }

    async fn save_draft(&self, draft: &Draft) -> Result<Option<Draft>, BackendError> {
        let request = SaveDraftRequest::from_draft(draft);
        let response: SaveDraftResponse = self.post_json(DRAFTS_PATH, request).await?;
        if !response.success {
            return Err(BackendError::rejected(response.error));
        }
        Ok(response.draft.map(|echo| echo.apply_to(draft)))
    }

    async fn delete_draft(&self, id: &DraftId) -> Result<(), BackendError> {
        let url = self.draft_endpoint(id)?;
        let response: StatusResponse = self.delete_json(url).await?;
        if !response.success {
            return Err(BackendError::rejected(response.error));
        }
        if let Some(message) = response.message {
            debug!("{}", message);
        }
        Ok(())
    }

    async fn default_prompts(&self) -> Result<PromptSet, BackendError> {
        self.get_json(DEFAULT_PROMPTS_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_onto_host() {
        let backend = HttpBackend::new("http://localhost:8000").unwrap();
        assert_eq!(
            backend.endpoint(INBOX_PATH).unwrap().as_str(),
            "http://localhost:8000/api/emails/load"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = HttpBackend::new("https://example.com/ocean").unwrap();
        assert_eq!(
            backend.endpoint(CHAT_PATH).unwrap().as_str(),
            "https://example.com/ocean/api/chat/query"
        );
    }

    #[test]
    fn test_draft_endpoint_encodes_id() {
        let backend = HttpBackend::new("http://localhost:8000/").unwrap();
        let url = backend.draft_endpoint(&DraftId::new("draft 1/a")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/drafts/draft%201%2Fa");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url"),
            Err(BackendError::Network(_))
        ));
    }
}
