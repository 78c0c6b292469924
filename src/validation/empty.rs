use crate::core::error::TileResult;
use crate::image_ops::{is_similar, ImageBackend, EMPTY_FINGERPRINT};
use crate::tile::Tile;
use image::RgbaImage;
use std::collections::HashMap;

/// 空タイル判定の既定閾値
pub const DEFAULT_EMPTY_THRESHOLD: f64 = 0.05;

/// 空タイル除去の結果
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub kept: Vec<Tile>,
    pub rejected: Vec<Tile>,
}

/// 空タイル判定フィルタ
///
/// タイルと同じサイズの完全透明画像を基準に、フィンガープリントが予約値と
/// 一致するか、知覚距離とピクセル差分率の両方が閾値未満なら空とみなす。
#[derive(Debug, Clone)]
pub struct EmptyFilter {
    threshold: f64,
    blanks: HashMap<(u32, u32), RgbaImage>,
}

impl Default for EmptyFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EMPTY_THRESHOLD)
    }
}

impl EmptyFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            blanks: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// タイルが空かどうかを判定
    pub fn is_empty_tile<I: ImageBackend + ?Sized>(
        &mut self,
        backend: &I,
        tile: &Tile,
    ) -> TileResult<bool> {
        if tile.fingerprint() == EMPTY_FINGERPRINT {
            return Ok(true);
        }

        let (width, height) = tile.dimensions();
        let blank = self
            .blanks
            .entry((width, height))
            .or_insert_with(|| RgbaImage::new(width, height));

        is_similar(backend, blank, tile.pixels(), self.threshold)
    }

    /// タイル列を空とそれ以外に分ける（順序は保持）
    pub fn filter<I: ImageBackend + ?Sized>(
        &mut self,
        backend: &I,
        tiles: Vec<Tile>,
    ) -> TileResult<FilterOutcome> {
        let mut outcome = FilterOutcome::default();

        for tile in tiles {
            if self.is_empty_tile(backend, &tile)? {
                outcome.rejected.push(tile);
            } else {
                outcome.kept.push(tile);
            }
        }

        log::debug!(
            "empty filter: kept {}, rejected {}",
            outcome.kept.len(),
            outcome.rejected.len()
        );
        Ok(outcome)
    }
}
