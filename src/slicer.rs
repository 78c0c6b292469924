// グリッド分割
//
// 原点から行優先（上の行帯を左から右へ、次に下の行帯）で画像を分割する。
// 端のタイルは残りの幅・高さに合わせて小さくなり、パディングはしない。

use crate::core::error::{TileError, TileResult};
use crate::image_ops::ImageBackend;
use crate::tile::{validate_sheet_name, Tile};
use image::RgbaImage;

/// タイル1枚分の矩形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 画像サイズとタイル最大サイズから矩形の並びを計算
pub fn grid_rects(
    image_width: u32,
    image_height: u32,
    max_tile_width: u32,
    max_tile_height: u32,
) -> TileResult<Vec<TileRect>> {
    if max_tile_width == 0 || max_tile_height == 0 {
        return Err(TileError::invalid_geometry(max_tile_width, max_tile_height));
    }

    let mut rects = Vec::new();
    let mut y = 0;
    while y < image_height {
        let height = max_tile_height.min(image_height - y);
        let mut x = 0;
        while x < image_width {
            let width = max_tile_width.min(image_width - x);
            rects.push(TileRect {
                x,
                y,
                width,
                height,
            });
            x += width;
        }
        y += height;
    }
    Ok(rects)
}

/// 画像をタイルに分割する
pub fn slice<I, T, S>(
    backend: &I,
    source: &RgbaImage,
    sheet_name: &str,
    max_tile_width: u32,
    max_tile_height: u32,
    tags: T,
) -> TileResult<Vec<Tile>>
where
    I: ImageBackend + ?Sized,
    T: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    validate_sheet_name(sheet_name)?;
    let rects = grid_rects(
        source.width(),
        source.height(),
        max_tile_width,
        max_tile_height,
    )?;
    let tags: Vec<String> = tags.into_iter().map(|t| t.as_ref().to_string()).collect();

    log::debug!(
        "slicing {}x{} image into {} tiles for '{}'",
        source.width(),
        source.height(),
        rects.len(),
        sheet_name
    );

    rects
        .into_iter()
        .map(|rect| {
            let pixels = backend.crop(source, rect.x, rect.y, rect.width, rect.height);
            Tile::new(backend, pixels, sheet_name, &tags)
        })
        .collect()
}
