//! Basic usage example for the BatchScale library

use batchscale::{init, Pipeline};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the library
    init()?;

    // Create a pipeline with auto-detected worker count
    let pipeline = Pipeline::new(None);

    // Halve every image in ./images into ./output
    let result = pipeline
        .run(Path::new("images"), Path::new("output"), 0.5)
        .await?;

    println!("Processed {} images:", result.discovered);
    println!("  Saved: {}", result.saved);
    println!("  Failed: {}", result.failed);
    println!("  Duration: {:.2}s", result.elapsed.as_secs_f64());

    for failure in &result.failures {
        println!("  {} -> {}", failure.source_path.display(), failure.error);
    }

    Ok(())
}
