//! Image decoding to a normalized grayscale buffer.

use image::GrayImage;
use log::debug;

/// Decode raw encoded bytes into a single-channel buffer.
///
/// No resizing or color correction happens here beyond grayscale conversion;
/// corrupt or ambiguous formats surface the decoder error to the caller, which
/// maps it to an `IMAGE_READ_ERROR` rejection.
pub fn decode_gray(bytes: &[u8]) -> Result<GrayImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let gray = decoded.to_luma8();
    debug!(
        "decoded {} bytes into {}x{} grayscale",
        bytes.len(),
        gray.width(),
        gray.height()
    );
    Ok(gray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Luma};
    use std::io::Cursor;

    #[test]
    fn test_decode_round_trips_png() {
        let mut img = GrayImage::from_pixel(8, 6, Luma([128u8]));
        img.put_pixel(3, 2, Luma([10u8]));

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(img.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let decoded = decode_gray(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.get_pixel(3, 2)[0], 10);
    }

    #[test]
    fn test_decode_rejects_garbage_bytes() {
        assert!(decode_gray(b"definitely not an image").is_err());
        assert!(decode_gray(&[]).is_err());
    }
}
