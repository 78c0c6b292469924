// 端末向けのタイルプレビュー
//
// 上下2ピクセルを1文字（▀）にまとめ、前景色を上、背景色を下のピクセルに
// した24bitカラーのANSIエスケープ列を生成する。

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use std::fmt::Write;

const UPPER_HALF_BLOCK: char = '\u{2580}';
const RESET: &str = "\x1b[0m";

/// 画像をANSIエスケープ付きの文字列に変換（幅は`max_columns`以下に縮小）
pub fn render_preview(image: &RgbaImage, max_columns: u32) -> String {
    if image.width() == 0 || image.height() == 0 || max_columns == 0 {
        return String::new();
    }

    let scaled;
    let image = if image.width() > max_columns {
        let height = ((image.height() as u64 * max_columns as u64) / image.width() as u64).max(1);
        scaled = image::imageops::resize(image, max_columns, height as u32, FilterType::Nearest);
        &scaled
    } else {
        image
    };

    let mut out = String::new();
    for y in (0..image.height()).step_by(2) {
        for x in 0..image.width() {
            let top = image.get_pixel(x, y);
            let bottom = (y + 1 < image.height()).then(|| image.get_pixel(x, y + 1));
            push_cell(&mut out, top, bottom);
        }
        out.push_str(RESET);
        out.push('\n');
    }
    out
}

fn push_cell(out: &mut String, top: &Rgba<u8>, bottom: Option<&Rgba<u8>>) {
    // 完全透明は端末の既定色のまま
    match opaque(top) {
        Some([r, g, b]) => {
            let _ = write!(out, "\x1b[38;2;{r};{g};{b}m");
        }
        None => out.push_str("\x1b[39m"),
    }
    match bottom.and_then(opaque) {
        Some([r, g, b]) => {
            let _ = write!(out, "\x1b[48;2;{r};{g};{b}m");
        }
        None => out.push_str("\x1b[49m"),
    }

    if opaque(top).is_some() {
        out.push(UPPER_HALF_BLOCK);
    } else {
        out.push(' ');
    }
}

/// 白背景にアルファ合成した色（完全透明なら`None`）
fn opaque(pixel: &Rgba<u8>) -> Option<[u8; 3]> {
    let [r, g, b, a] = pixel.0;
    if a == 0 {
        return None;
    }
    let alpha = a as u32;
    let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
    Some([blend(r), blend(g), blend(b)])
}
