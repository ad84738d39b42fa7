//! Image editing example - modifies an existing image with a text instruction.
//!
//! Run with: `cargo run --example edit_image -- <input_image.png> "<instruction>"`
//!
//! Requires `API_KEY` (or `GEMINI_API_KEY` / `GOOGLE_API_KEY`).

use image_studio::{image, Studio, StudioConfig, SubmitOutcome};

#[tokio::main]
async fn main() -> image_studio::Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .expect("Usage: edit_image <input_image.png> [instruction]");
    let instruction = args
        .next()
        .unwrap_or_else(|| "Add a retro filter and make the colors warmer".to_string());

    let studio = Studio::from_config(StudioConfig::from_env()?);
    studio.upload(image::read_file(&input_path)?)?;
    studio.set_instruction(instruction);

    let outcome = studio.submit().await;
    let state = studio.snapshot();
    match (outcome, state.result_image()) {
        (SubmitOutcome::Succeeded, Some(result)) => {
            let size = result.save("edited.png")?;
            println!("Edited image saved to edited.png ({size} bytes)");
        }
        _ => eprintln!("Edit failed: {}", state.error_message().unwrap_or("unknown error")),
    }

    Ok(())
}
