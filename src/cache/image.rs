//! Order pictures held by the object cache.

use std::fmt;

use super::traits::{CacheObject, DecodeError};

/// Image container formats accepted for order pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
  Png,
  Jpeg,
  Gif,
  WebP,
  Bmp,
}

impl ImageFormat {
  fn from_guessed(format: ::image::ImageFormat) -> Option<Self> {
    match format {
      ::image::ImageFormat::Png => Some(ImageFormat::Png),
      ::image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
      ::image::ImageFormat::Gif => Some(ImageFormat::Gif),
      ::image::ImageFormat::WebP => Some(ImageFormat::WebP),
      ::image::ImageFormat::Bmp => Some(ImageFormat::Bmp),
      _ => None,
    }
  }

  fn as_image_format(self) -> ::image::ImageFormat {
    match self {
      ImageFormat::Png => ::image::ImageFormat::Png,
      ImageFormat::Jpeg => ::image::ImageFormat::Jpeg,
      ImageFormat::Gif => ::image::ImageFormat::Gif,
      ImageFormat::WebP => ::image::ImageFormat::WebP,
      ImageFormat::Bmp => ::image::ImageFormat::Bmp,
    }
  }
}

impl fmt::Display for ImageFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ImageFormat::Png => "PNG",
      ImageFormat::Jpeg => "JPEG",
      ImageFormat::Gif => "GIF",
      ImageFormat::WebP => "WebP",
      ImageFormat::Bmp => "BMP",
    };
    f.write_str(name)
  }
}

/// A picture that decoded cleanly: its format, pixel size, and encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
  pub format: ImageFormat,
  pub width: u32,
  pub height: u32,
  pub bytes: Vec<u8>,
}

impl ImageAsset {
  pub fn size(&self) -> usize {
    self.bytes.len()
  }
}

fn decode_error(reason: impl fmt::Display) -> DecodeError {
  DecodeError {
    expected: "image",
    reason: reason.to_string(),
  }
}

impl CacheObject for ImageAsset {
  /// Fully decodes the payload, so truncated or corrupt pictures are
  /// rejected rather than cached.
  fn decode(bytes: Vec<u8>) -> Result<Self, DecodeError> {
    let guessed = ::image::guess_format(&bytes).map_err(decode_error)?;
    let format = ImageFormat::from_guessed(guessed)
      .ok_or_else(|| decode_error(format!("unsupported image format {:?}", guessed)))?;

    let decoded =
      ::image::load_from_memory_with_format(&bytes, format.as_image_format()).map_err(decode_error)?;

    Ok(ImageAsset {
      format,
      width: decoded.width(),
      height: decoded.height(),
      bytes,
    })
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use std::io::Cursor;

  fn encode(format: ::image::ImageFormat) -> Vec<u8> {
    let pixels = ::image::RgbImage::from_pixel(4, 3, ::image::Rgb([200, 40, 10]));
    let mut bytes = Vec::new();
    ::image::DynamicImage::ImageRgb8(pixels)
      .write_to(&mut Cursor::new(&mut bytes), format)
      .unwrap();
    bytes
  }

  /// A valid 4x3 PNG.
  pub(crate) fn png_bytes() -> Vec<u8> {
    encode(::image::ImageFormat::Png)
  }

  #[test]
  fn test_decode_png() {
    let bytes = png_bytes();
    let image = ImageAsset::decode(bytes.clone()).unwrap();

    assert_eq!(image.format, ImageFormat::Png);
    assert_eq!((image.width, image.height), (4, 3));
    assert_eq!(image.size(), bytes.len());
    assert_eq!(image.format.to_string(), "PNG");
  }

  #[test]
  fn test_decode_jpeg() {
    let image = ImageAsset::decode(encode(::image::ImageFormat::Jpeg)).unwrap();
    assert_eq!(image.format, ImageFormat::Jpeg);
    assert_eq!((image.width, image.height), (4, 3));
  }

  #[test]
  fn test_rejects_non_images() {
    let err = ImageAsset::decode(b"{\"error\": true}".to_vec()).unwrap_err();
    assert_eq!(err.expected, "image");

    assert!(ImageAsset::decode(Vec::new()).is_err());
  }

  #[test]
  fn test_rejects_signature_without_image() {
    let bytes = b"\x89PNG\r\n\x1a\nthis is not an image at all".to_vec();
    assert!(ImageAsset::decode(bytes).is_err());
  }

  #[test]
  fn test_rejects_truncated_image() {
    let mut bytes = png_bytes();
    bytes.truncate(bytes.len() / 2);
    assert!(ImageAsset::decode(bytes).is_err());
  }
}
