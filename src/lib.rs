//! # inliner-rs
//!
//! Async Rust client for [Inliner.ai](https://inliner.ai), a service for AI
//! image generation and CDN hosting.
//!
//! Generation and edit jobs run server-side; this crate derives the content
//! path up front, starts the job, and polls until the image is ready or the
//! budget runs out. Edits on hosted images chain onto the source path, so
//! `web/cat.png` edited with "make it blue" lives at
//! `web/cat/make-it-blue.png`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use inliner_rs::{EditRequest, GenerateRequest, InlinerClient, PollOptions};
//!
//! # async fn example() -> inliner_rs::Result<()> {
//! let client = InlinerClient::from_env()?;
//!
//! // Generate, letting the server suggest a slug
//! let image = client
//!     .generate_image(&GenerateRequest::new("web", "a neon lizard").smart_url(true))
//!     .await?;
//! std::fs::write("lizard.png", &image.data).unwrap();
//!
//! // Edit the result, giving up after 60 seconds
//! let edited = client
//!     .edit_image_with(
//!         &EditRequest::new(&image.url, "make it blue").size(512, 512),
//!         &PollOptions::default().max_seconds(60),
//!     )
//!     .await?;
//! println!("{}", edited.url);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod mime;
pub mod path;
pub mod poll;
pub mod result;
pub mod slug;
pub mod transport;
pub mod types;

pub use client::{InlinerClient, PollOptions};
pub use config::{InlinerConfig, InlinerConfigBuilder, RecommendationPolicy};
pub use error::{InlinerError, RecommendationError, Result};
pub use poll::{PollOutcome, Poller};
pub use result::Payload;
pub use slug::slugify;
pub use transport::{
    FormPart, ReqwestTransport, RequestBody, Transport, TransportRequest, TransportResponse,
};
pub use types::{
    CreateProject, EditRequest, FileSource, GenerateRequest, GenerationResult, ListImagesQuery,
    SearchQuery, TagAction, UploadResult, UploadSpec,
};
