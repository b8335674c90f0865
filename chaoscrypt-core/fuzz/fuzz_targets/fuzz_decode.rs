#![no_main]

//! Fuzz target for Image::decode()
//!
//! Malformed PNG/JPEG/GIF/WebP input must surface as an error, never a panic.
//!
//! Run with: cargo +nightly fuzz run fuzz_decode

use chaoscrypt_core::Image;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(image) = Image::decode(data) {
        let _ = image.encode_png();
    }
});
