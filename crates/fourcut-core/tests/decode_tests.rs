//! Tests decoding of user-selected image files into frames.

use std::io::Cursor;

use fourcut_core::{CoreError, decode_image};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

fn png_bytes(width: u32, height: u32, red: u8) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([red, 10, 20, 255]));
    let mut encoded = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut encoded, ImageFormat::Png)
        .expect("png encoding should succeed");
    encoded.into_inner()
}

#[test]
fn decode_tests_png_round_trips_pixels() {
    let frame = decode_image(&png_bytes(3, 2, 200)).expect("png should decode");
    assert_eq!(frame.width, 3);
    assert_eq!(frame.height, 2);
    assert_eq!(&frame.rgba[..4], &[200, 10, 20, 255]);
}

#[test]
fn decode_tests_garbage_is_a_decode_failure() {
    let error = decode_image(b"definitely not an image").expect_err("garbage must fail");
    assert!(matches!(error, CoreError::Decode(_)));
}
