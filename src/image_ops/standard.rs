use super::diff::{diff_fraction, DEFAULT_PIXEL_THRESHOLD};
use super::fingerprint::{dct_hash, encode_fingerprint, normalized_distance};
use super::ImageBackend;
use crate::core::error::{TileError, TileResult};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// `image`クレートを使った標準の画像処理実装
#[derive(Clone, Debug)]
pub struct StandardImageBackend {
    pixel_threshold: f64,
}

impl Default for StandardImageBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardImageBackend {
    /// 新しい標準バックエンドを作成
    pub fn new() -> Self {
        Self {
            pixel_threshold: DEFAULT_PIXEL_THRESHOLD,
        }
    }

    /// ピクセル単位の色差閾値を指定して作成
    pub fn with_pixel_threshold(pixel_threshold: f64) -> Self {
        Self { pixel_threshold }
    }

    fn ensure_same_size(a: &RgbaImage, b: &RgbaImage) -> TileResult<()> {
        if a.dimensions() != b.dimensions() {
            return Err(TileError::dimension_mismatch(a.dimensions(), b.dimensions()));
        }
        Ok(())
    }
}

impl ImageBackend for StandardImageBackend {
    fn decode(&self, data: &[u8], source_name: &str) -> TileResult<RgbaImage> {
        let image =
            image::load_from_memory(data).map_err(|e| TileError::decode(source_name, e))?;
        Ok(image.to_rgba8())
    }

    fn encode(&self, image: &RgbaImage, format: ImageFormat) -> TileResult<Vec<u8>> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), format)
            .map_err(TileError::encode)?;
        Ok(buffer)
    }

    fn crop(&self, image: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
        image::imageops::crop_imm(image, x, y, width, height).to_image()
    }

    fn hash(&self, image: &RgbaImage) -> String {
        encode_fingerprint(dct_hash(image).as_ref())
    }

    fn perceptual_distance(&self, a: &RgbaImage, b: &RgbaImage) -> TileResult<f64> {
        Self::ensure_same_size(a, b)?;
        Ok(normalized_distance(
            dct_hash(a).as_ref(),
            dct_hash(b).as_ref(),
        ))
    }

    fn pixel_diff_percent(&self, a: &RgbaImage, b: &RgbaImage) -> TileResult<f64> {
        Self::ensure_same_size(a, b)?;
        Ok(diff_fraction(a, b, self.pixel_threshold))
    }

    fn backend_name(&self) -> &'static str {
        "Standard"
    }
}
