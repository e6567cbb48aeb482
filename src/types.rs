use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Final image returned by a generate or edit job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub data: Vec<u8>,
    pub url: String,
    pub content_path: String,
}

/// Text-to-image job.
///
/// # Example
/// ```
/// use inliner_rs::GenerateRequest;
///
/// let req = GenerateRequest::new("web", "a neon lizard")
///     .size(800, 600)
///     .format("jpg")
///     .smart_url(true);
/// assert_eq!(req.format, "jpg");
/// ```
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub project: String,
    pub prompt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: String,
    pub smart_url: bool,
}

impl GenerateRequest {
    /// Create a request for `prompt` in `project`. Format defaults to png.
    pub fn new(project: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            prompt: prompt.into(),
            width: None,
            height: None,
            format: "png".to_string(),
            smart_url: false,
        }
    }

    /// Set output dimensions.
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the output format (png, jpg, webp, ...).
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Ask the server for a recommended slug before generating.
    pub fn smart_url(mut self, enabled: bool) -> Self {
        self.smart_url = enabled;
        self
    }
}

/// Image edit job. `source` is either an http(s) URL or a local file path.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub source: String,
    pub instruction: String,
    pub project: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: String,
}

impl EditRequest {
    pub fn new(source: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            instruction: instruction.into(),
            project: None,
            width: None,
            height: None,
            format: "png".to_string(),
        }
    }

    /// Project namespace. Required when `source` is a local file.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}

/// Where upload bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A file to host under a project.
#[derive(Debug, Clone)]
pub struct UploadSpec {
    pub file: FileSource,
    pub filename: String,
    pub project: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: BTreeSet<String>,
    pub collection_id: Option<String>,
}

impl UploadSpec {
    pub fn new(file: FileSource, filename: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            file,
            filename: filename.into(),
            project: project.into(),
            slug: None,
            title: None,
            description: None,
            tags: BTreeSet::new(),
            collection_id: None,
        }
    }

    /// Upload a file from disk, using its file name.
    pub fn from_path(path: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Self::new(FileSource::Path(path), filename, project)
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn collection(mut self, id: impl Into<String>) -> Self {
        self.collection_id = Some(id.into());
        self
    }
}

/// Where an uploaded file landed.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub content_path: String,
    pub url: String,
    /// Full server response, for fields this client does not model.
    pub raw: Value,
}

/// Filters for listing hosted images.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListImagesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Full-text search over hosted images.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(rename = "q")]
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Body for creating a project namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Which tag operation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    Add,
    Remove,
    Replace,
}

impl TagAction {
    pub(crate) fn endpoint(self) -> &'static str {
        match self {
            TagAction::Add => "content/tags",
            TagAction::Remove => "content/tags/remove",
            TagAction::Replace => "content/tags/replace",
        }
    }
}
