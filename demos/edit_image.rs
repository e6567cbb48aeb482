//! Edit a hosted image by URL, or a local file (uploaded first).
//!
//! ```sh
//! cargo run --example edit_image -- https://img.inliner.ai/demo/cat.png "make it blue"
//! cargo run --example edit_image -- ./cat.png "make it blue" demo
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use inliner_rs::{EditRequest, InlinerClient, InlinerError, PollOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: edit_image <url-or-path> <instruction> [project]");
        return Ok(());
    }

    let mut request = EditRequest::new(&args[1], &args[2]);
    if let Some(project) = args.get(3) {
        request = request.project(project);
    }

    // Ctrl-C aborts the poll at the next attempt
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let client = InlinerClient::from_env()?;
    let options = PollOptions::default().with_cancellation(cancel);

    match client.edit_image_with(&request, &options).await {
        Ok(image) => println!("Edited image: {} ({} bytes)", image.url, image.data.len()),
        Err(InlinerError::Timeout { label, max_seconds }) => {
            eprintln!("{} did not finish within {}s", label, max_seconds)
        }
        Err(InlinerError::Cancelled { .. }) => eprintln!("Cancelled"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
