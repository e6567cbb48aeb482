use std::fmt;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{InlinerConfig, RecommendationPolicy};
use crate::error::{InlinerError, RecommendationError, Result};
use crate::mime::content_type_for;
use crate::path;
use crate::poll::{extract_payload, Poller};
use crate::result::{wrap, Payload};
use crate::slug::slugify;
use crate::transport::{query_pairs, FormPart, ReqwestTransport, Transport, TransportRequest};
use crate::types::*;

/// Per-call polling overrides.
#[derive(Debug, Clone, Default)]
pub struct PollOptions {
    /// Polling budget in seconds; `None` uses the configured default.
    pub max_seconds: Option<u64>,
    /// Set to `true` from another task to abort the poll.
    pub cancellation: Option<Arc<AtomicBool>>,
}

impl PollOptions {
    /// Override the polling budget for this call.
    pub fn max_seconds(mut self, seconds: u64) -> Self {
        self.max_seconds = Some(seconds);
        self
    }

    /// Abort the poll once `flag` is set to `true`.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }
}

/// Async client for the Inliner.ai API and CDN.
///
/// Configuration is frozen at construction; clones share the same
/// transport and can run independent jobs concurrently.
///
/// # Example
/// ```no_run
/// use inliner_rs::{GenerateRequest, InlinerClient};
///
/// # async fn example() -> inliner_rs::Result<()> {
/// let client = InlinerClient::new("sk-...")?;
/// let image = client
///     .generate_image(&GenerateRequest::new("web", "a neon lizard").size(800, 600))
///     .await?;
/// println!("{} ({} bytes)", image.url, image.data.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InlinerClient {
    config: Arc<InlinerConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for InlinerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlinerClient")
            .field("api_base_url", &self.config.api_base_url)
            .field("image_base_url", &self.config.image_base_url)
            .finish_non_exhaustive()
    }
}

impl InlinerClient {
    /// Client with default endpoints for the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(InlinerConfig::new(api_key))
    }

    /// Client backed by `reqwest` using `config`.
    pub fn with_config(config: InlinerConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Client configured from `INLINER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::with_config(InlinerConfig::from_env()?)
    }

    /// Client with a caller-supplied transport.
    pub fn with_transport(config: InlinerConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &InlinerConfig {
        &self.config
    }

    /// Public CDN URL for a content path.
    pub fn build_image_url(&self, content_path: &str) -> String {
        self.config.image_url(content_path)
    }

    // ── Generation ──────────────────────────────────────────────────

    /// Generate an image and wait for it, using the default polling budget.
    pub async fn generate_image(&self, request: &GenerateRequest) -> Result<GenerationResult> {
        self.generate_image_with(request, &PollOptions::default())
            .await
    }

    /// Generate an image with polling overrides.
    pub async fn generate_image_with(
        &self,
        request: &GenerateRequest,
        options: &PollOptions,
    ) -> Result<GenerationResult> {
        if request.project.trim().is_empty() {
            return Err(InlinerError::Validation("A project is required to generate".into()));
        }
        let slug = self.choose_slug(request).await?;
        if slug.is_empty() {
            return Err(InlinerError::Validation(format!(
                "Prompt {:?} does not produce a usable slug",
                request.prompt
            )));
        }

        let body = json!({
            "prompt": request.prompt,
            "slug": slug,
            "project": request.project,
            "width": request.width,
            "height": request.height,
            "format": request.format,
        });
        let resp = self.api_post("content/generate", body).await?;

        // The server may wrap its answer in `result` and echo the path it chose
        let envelope = resp.get("result").unwrap_or(&resp);
        let echoed = resp
            .get("result")
            .and_then(|r| r.get("prompt"))
            .and_then(|p| p.as_str());

        let content_path = path::for_generation(
            &request.project,
            &slug,
            request.width,
            request.height,
            &request.format,
            echoed,
        );

        if let Some(payload) = extract_payload(envelope) {
            debug!(content_path = %content_path, "generation returned inline payload");
            return wrap(&self.config, Payload::Text(payload.to_string()), &content_path);
        }

        self.poll_image_with(&content_path, "Generating", options)
            .await
    }

    async fn choose_slug(&self, request: &GenerateRequest) -> Result<String> {
        let local = slugify(&request.prompt);
        if !request.smart_url {
            return Ok(local);
        }

        match self.recommend_slug(request).await {
            Ok(slug) => Ok(slug),
            Err(e) => match self.config.recommendation_policy {
                RecommendationPolicy::BestEffort => {
                    warn!(error = %e, fallback = %local, "smart URL recommendation failed, using local slug");
                    Ok(local)
                }
                RecommendationPolicy::Required => Err(e.into()),
            },
        }
    }

    /// Ask the server for a recommended slug for this request.
    pub async fn recommend_slug(
        &self,
        request: &GenerateRequest,
    ) -> std::result::Result<String, RecommendationError> {
        let body = json!({
            "prompt": request.prompt,
            "project": request.project,
            "width": request.width,
            "height": request.height,
            "format": request.format,
        });
        let resp = self
            .api_post("url/recommend", body)
            .await
            .map_err(|e| RecommendationError::Request(Box::new(e)))?;

        let slug = resp
            .get("slug")
            .and_then(|s| s.as_str())
            .map(slugify)
            .unwrap_or_default();
        if slug.is_empty() {
            return Err(RecommendationError::EmptySuggestion);
        }
        Ok(slug)
    }

    // ── Editing ─────────────────────────────────────────────────────

    /// Edit an image by URL or local path and wait for the result.
    pub async fn edit_image(&self, request: &EditRequest) -> Result<GenerationResult> {
        self.edit_image_with(request, &PollOptions::default()).await
    }

    /// Edit an image with polling overrides.
    ///
    /// Remote sources chain the edit onto the source's path. Local files
    /// are uploaded first under a timestamped slug, which requires a
    /// project.
    pub async fn edit_image_with(
        &self,
        request: &EditRequest,
        options: &PollOptions,
    ) -> Result<GenerationResult> {
        if slugify(&request.instruction).is_empty() {
            return Err(InlinerError::Validation(format!(
                "Instruction {:?} does not produce a usable slug",
                request.instruction
            )));
        }

        let content_path = if path::is_remote(&request.source) {
            path::for_remote_edit(
                &request.source,
                &request.instruction,
                request.width,
                request.height,
                &request.format,
            )?
        } else {
            let project = request
                .project
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| {
                    InlinerError::Validation(
                        "A project is required to edit a local file".into(),
                    )
                })?;

            let spec = UploadSpec::from_path(&request.source, project)
                .slug(format!("edit-source-{}", Utc::now().timestamp_millis()));
            let uploaded = self.upload_image(spec).await?;
            path::chain_edit(
                &uploaded.content_path,
                &request.instruction,
                request.width,
                request.height,
                &request.format,
            )
        };

        self.poll_image_with(&content_path, "Editing", options)
            .await
    }

    // ── Polling ─────────────────────────────────────────────────────

    /// Wait for `content_path` to become available.
    pub async fn poll_image(&self, content_path: &str, max_seconds: u64) -> Result<GenerationResult> {
        self.poll_image_with(
            content_path,
            "Polling",
            &PollOptions::default().max_seconds(max_seconds),
        )
        .await
    }

    async fn poll_image_with(
        &self,
        content_path: &str,
        label: &str,
        options: &PollOptions,
    ) -> Result<GenerationResult> {
        let max_seconds = options.max_seconds.unwrap_or(self.config.max_poll_seconds);
        Poller::new(self.transport.as_ref(), &self.config)
            .with_cancellation(options.cancellation.clone())
            .poll(content_path, label, max_seconds)
            .await
    }

    // ── Upload ──────────────────────────────────────────────────────

    /// Upload a file to the CDN under `spec.project`.
    pub async fn upload_image(&self, spec: UploadSpec) -> Result<UploadResult> {
        let bytes = match spec.file {
            FileSource::Bytes(bytes) => bytes,
            FileSource::Path(ref p) => read_file(p).await?,
        };

        let slug = match spec.slug.as_deref() {
            Some(s) => slugify(s),
            None => slugify(file_stem(&spec.filename)),
        };

        let mut parts = vec![
            FormPart::File {
                name: "file".into(),
                filename: spec.filename.clone(),
                content_type: content_type_for(&spec.filename).to_string(),
                bytes,
            },
            text_part("project", &spec.project),
            text_part("slug", &slug),
        ];
        if let Some(ref title) = spec.title {
            parts.push(text_part("title", title));
        }
        if let Some(ref description) = spec.description {
            parts.push(text_part("description", description));
        }
        if !spec.tags.is_empty() {
            let tags = spec.tags.iter().cloned().collect::<Vec<_>>().join(",");
            parts.push(text_part("tags", &tags));
        }
        if let Some(ref collection) = spec.collection_id {
            parts.push(text_part("collectionId", collection));
        }

        let request = TransportRequest::post(self.config.api_url("content/upload"))
            .bearer(&self.config.api_key)
            .multipart(parts);
        let raw: Value = self.transport.send(request).await?.json()?;

        let envelope = raw.get("result").unwrap_or(&raw);
        let content_path = ["contentPath", "path"]
            .iter()
            .find_map(|k| envelope.get(*k).and_then(|v| v.as_str()))
            .map(|p| p.trim_start_matches('/').to_string())
            .ok_or_else(|| {
                InlinerError::InvalidResponse("Upload response missing contentPath".into())
            })?;
        let url = envelope
            .get("url")
            .and_then(|u| u.as_str())
            .map(String::from)
            .unwrap_or_else(|| self.config.image_url(&content_path));

        Ok(UploadResult {
            content_path,
            url,
            raw,
        })
    }

    // ── Content ─────────────────────────────────────────────────────

    /// List hosted images.
    pub async fn list_images(&self, query: &ListImagesQuery) -> Result<Value> {
        self.api_get("content/images", query_pairs(query)?).await
    }

    /// Search hosted images.
    pub async fn search(&self, query: &SearchQuery) -> Result<Value> {
        self.api_get("content/search", query_pairs(query)?).await
    }

    /// Delete images by content ID.
    pub async fn delete_images(&self, ids: &[String]) -> Result<Value> {
        self.api_post("content/delete", json!({ "ids": ids })).await
    }

    /// Rename an image. The new name is slugified.
    pub async fn rename_image(&self, id: &str, new_name: &str) -> Result<Value> {
        let slug = slugify(new_name);
        if slug.is_empty() {
            return Err(InlinerError::Validation(format!(
                "{:?} does not produce a usable slug",
                new_name
            )));
        }
        self.api_post(&format!("content/rename/{}", id), json!({ "slug": slug }))
            .await
    }

    // ── Tags ────────────────────────────────────────────────────────

    /// All tags in the account.
    pub async fn get_all_tags(&self) -> Result<Value> {
        self.api_get("content/tags", Vec::new()).await
    }

    /// Add `tags` to each image in `ids`.
    pub async fn add_tags(&self, ids: &[String], tags: &[String]) -> Result<Value> {
        self.update_tags(TagAction::Add, ids, tags).await
    }

    /// Remove `tags` from each image in `ids`.
    pub async fn remove_tags(&self, ids: &[String], tags: &[String]) -> Result<Value> {
        self.update_tags(TagAction::Remove, ids, tags).await
    }

    /// Replace the tags on each image in `ids` with `tags`.
    pub async fn replace_tags(&self, ids: &[String], tags: &[String]) -> Result<Value> {
        self.update_tags(TagAction::Replace, ids, tags).await
    }

    async fn update_tags(&self, action: TagAction, ids: &[String], tags: &[String]) -> Result<Value> {
        self.api_post(action.endpoint(), json!({ "contentIds": ids, "tags": tags }))
            .await
    }

    // ── Projects ────────────────────────────────────────────────────

    /// Projects in the account.
    pub async fn list_projects(&self) -> Result<Value> {
        self.api_get("account/projects", Vec::new()).await
    }

    /// Create a project; the returned body carries its id.
    pub async fn create_project(&self, project: &CreateProject) -> Result<Value> {
        self.api_post("account/projects", serde_json::to_value(project)?)
            .await
    }

    /// Details for one project by id.
    pub async fn get_project_details(&self, id: &str) -> Result<Value> {
        self.api_get(&format!("account/projects/{}", id), Vec::new())
            .await
    }

    // ── Plumbing ────────────────────────────────────────────────────

    async fn api_get(&self, path: &str, query: Vec<(String, String)>) -> Result<Value> {
        let request = TransportRequest::get(self.config.api_url(path))
            .bearer(&self.config.api_key)
            .query(query);
        parse_json_body(&self.transport.send(request).await?.body)
    }

    async fn api_post(&self, path: &str, body: Value) -> Result<Value> {
        let request = TransportRequest::post(self.config.api_url(path))
            .bearer(&self.config.api_key)
            .json(body);
        parse_json_body(&self.transport.send(request).await?.body)
    }
}

fn parse_json_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(body)?)
}

fn text_part(name: &str, value: &str) -> FormPart {
    FormPart::Text {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn file_stem(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| InlinerError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
