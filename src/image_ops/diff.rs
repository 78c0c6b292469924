// ピクセル差分率の計算
//
// 各ピクセルを白背景にアルファ合成してYIQ色空間の距離を求め、
// 閾値を超えたピクセルの割合を返す。

use image::{Rgba, RgbaImage};

/// ピクセル単位の色差閾値（0.0〜1.0）
pub const DEFAULT_PIXEL_THRESHOLD: f64 = 0.1;

/// YIQ距離の最大値（白と黒の距離）
const MAX_YIQ_DELTA: f64 = 35215.0;

/// 同じサイズの2画像で、色差が閾値を超えるピクセルの割合を返す
///
/// 呼び出し側でサイズが一致していることを保証すること。
pub fn diff_fraction(left: &RgbaImage, right: &RgbaImage, pixel_threshold: f64) -> f64 {
    let total = left.width() as u64 * left.height() as u64;
    if total == 0 {
        return 0.0;
    }

    let max_delta = MAX_YIQ_DELTA * pixel_threshold * pixel_threshold;
    let differing = left
        .pixels()
        .zip(right.pixels())
        .filter(|(a, b)| a != b && color_delta(a, b) > max_delta)
        .count() as u64;

    differing as f64 / total as f64
}

fn color_delta(left: &Rgba<u8>, right: &Rgba<u8>) -> f64 {
    let (r1, g1, b1) = blend_on_white(left);
    let (r2, g2, b2) = blend_on_white(right);

    let y = luminance(r1, g1, b1) - luminance(r2, g2, b2);
    let i = in_phase(r1, g1, b1) - in_phase(r2, g2, b2);
    let q = quadrature(r1, g1, b1) - quadrature(r2, g2, b2);

    0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q
}

fn blend_on_white(pixel: &Rgba<u8>) -> (f64, f64, f64) {
    let [r, g, b, a] = pixel.0;
    let alpha = a as f64 / 255.0;
    let blend = |c: u8| 255.0 + (c as f64 - 255.0) * alpha;
    (blend(r), blend(g), blend(b))
}

fn luminance(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn in_phase(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn quadrature(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}
