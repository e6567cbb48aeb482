//! Generate an image from a text prompt and save it locally.
//!
//! Requires `INLINER_API_KEY` in the environment.
//!
//! ```sh
//! RUST_LOG=inliner_rs=debug cargo run --example generate_image -- "a neon lizard"
//! ```

use inliner_rs::{GenerateRequest, InlinerClient, PollOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a neon lizard on a skateboard".to_string());

    let client = InlinerClient::from_env()?;
    let request = GenerateRequest::new("demo", &prompt)
        .size(1024, 768)
        .smart_url(true);

    println!("Generating: {}", prompt);
    let image = client
        .generate_image_with(&request, &PollOptions::default().max_seconds(120))
        .await?;

    let filename = image
        .content_path
        .rsplit('/')
        .next()
        .unwrap_or("image.png")
        .to_string();
    std::fs::write(&filename, &image.data)?;
    println!("Saved {} ({} bytes)", filename, image.data.len());
    println!("Hosted at {}", image.url);

    Ok(())
}
