//! Example demonstrating pipeline tracing instrumentation.
//!
//! Run with: cargo run -p chaoscrypt-core --example pipeline_tracing

use tracing_subscriber::{fmt, EnvFilter};

use chaoscrypt_core::{metrics, AlgorithmId, EncryptRequest, Engine, EngineConfig, Image};

fn main() {
    // Initialize tracing subscriber with debug level
    fmt()
        .with_env_filter(EnvFilter::new("chaoscrypt_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== Chaotic Pipeline Tracing Demo ===\n");

    let config = EngineConfig::from_env();
    println!("Config: {:?}\n", config);
    let engine = Engine::new(config);

    // Horizontal gradient, easy to recognise if anything leaks through
    let (width, height) = (64u32, 64u32);
    let data: Vec<u8> = (0..height)
        .flat_map(|_| (0..width).flat_map(|x| [(x * 4) as u8, 128, 255 - (x * 4) as u8]))
        .collect();
    let image = match Image::new(width, height, 3, data) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Failed to build image: {}", e);
            return;
        }
    };

    for algorithm in AlgorithmId::ALL {
        println!("\n--- {} ---\n", algorithm);
        let request = EncryptRequest::new(image.clone(), "tracing demo", algorithm);
        let encrypted = match engine.encrypt(&request) {
            Ok(res) => res,
            Err(e) => {
                println!("\n❌ Encryption failed: {}", e);
                continue;
            }
        };

        match engine.decrypt(&encrypted.cipher_image().into_request("tracing demo")) {
            Ok(res) => {
                let reference = if algorithm.grayscale_only() {
                    image.to_grayscale()
                } else {
                    image.clone()
                };
                let psnr = metrics::psnr(&reference, &res.decrypted_image).unwrap_or(f64::NAN);
                println!("\n✅ Round trip");
                println!("   Nonce:   {}", encrypted.nonce.as_deref().unwrap_or("-"));
                println!("   Entropy: {:.4}", encrypted.metrics.entropy_encrypted);
                println!("   NPCR:    {:.2}%", encrypted.metrics.npcr);
                println!("   UACI:    {:.2}%", encrypted.metrics.uaci);
                println!("   PSNR:    {} dB", psnr);
            }
            Err(e) => {
                println!("\n❌ Decryption failed: {}", e);
            }
        }
    }
}
