//! Product shot example - turns a clothing photo into an e-commerce image.
//!
//! Run with: `cargo run --example product_shot -- <clothing_photo.jpg>`
//!
//! Requires `API_KEY` (or `GEMINI_API_KEY` / `GOOGLE_API_KEY`).

use image_studio::{image, GeminiGateway, Mode, Studio, StudioConfig};

#[tokio::main]
async fn main() -> image_studio::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: product_shot <clothing_photo.jpg>");

    let config = StudioConfig::from_env()?;
    let gateway = GeminiGateway::from_config(&config);
    if !gateway.is_configured() {
        eprintln!("No API key configured; the request will be refused.");
    }

    let studio = Studio::with_gateway(gateway, config);
    studio.upload(image::read_file(&input_path)?)?;
    studio.set_mode(Mode::ProductShot);
    studio.submit().await;

    let state = studio.snapshot();
    if let Some(result) = state.result_image() {
        let size = result.save("product.png")?;
        println!("Product shot saved to product.png ({size} bytes)");
    } else if let Some(message) = state.error_message() {
        eprintln!("{message}");
    }

    Ok(())
}
