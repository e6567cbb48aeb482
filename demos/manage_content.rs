//! Upload, tag, search, and list hosted content.
//!
//! ```sh
//! cargo run --example manage_content -- ./photo.jpg demo
//! ```

use inliner_rs::{InlinerClient, ListImagesQuery, SearchQuery, UploadSpec};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: manage_content <file> <project>");
        return Ok(());
    }
    let project = &args[2];

    let client = InlinerClient::from_env()?;

    let projects = client.list_projects().await?;
    println!("Projects: {}", serde_json::to_string_pretty(&projects)?);

    let uploaded = client
        .upload_image(
            UploadSpec::from_path(&args[1], project)
                .title("Uploaded from inliner-rs")
                .tag("demo"),
        )
        .await?;
    println!("Uploaded to {}", uploaded.url);

    let tags = client.get_all_tags().await?;
    println!("Tags: {}", tags);

    let found = client
        .search(&SearchQuery {
            project: Some(project.clone()),
            ..SearchQuery::new("demo")
        })
        .await?;
    println!("Search: {}", found);

    let listed = client
        .list_images(&ListImagesQuery {
            project: Some(project.clone()),
            limit: Some(10),
            ..Default::default()
        })
        .await?;
    println!("Latest images: {}", listed);

    Ok(())
}
