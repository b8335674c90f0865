#![no_main]

//! Fuzz target for decryption
//!
//! Treats the input as a small grayscale ciphertext and decrypts it under
//! every algorithm. Wrong keys produce garbage, but must never panic.
//!
//! Run with: cargo +nightly fuzz run fuzz_decrypt

use chaoscrypt_core::{AlgorithmId, DecryptRequest, Engine, Image};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let width = (data[0] % 16) as u32 + 1;
    let body = &data[1..];
    let height = (body.len() as u32 / width).min(16);
    if height == 0 {
        return;
    }
    let pixels = body[..(width * height) as usize].to_vec();
    let Ok(image) = Image::new(width, height, 1, pixels) else {
        return;
    };
    let engine = Engine::default();
    for algorithm in AlgorithmId::ALL {
        let request = DecryptRequest::new(image.clone(), "fuzz", algorithm).with_nonce("00");
        let _ = engine.decrypt(&request);
    }
});
