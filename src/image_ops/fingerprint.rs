// DCTベースの知覚ハッシュ（フィンガープリント）
//
// img_hashのDCT前処理 + 平均値ハッシュで8x8=64ビットを作る。
// アルファは黒背景に乗算してからハッシュするため、完全透明は黒と同じになる。
// 画素が全て同じ画像（単色・完全透明）はハッシュせず全ビット0とする。
// 文字列表現は64ビットを11文字のbase64（独自アルファベット）で表す。

use base64::alphabet::Alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::Engine;
use image::{Rgb, RgbImage, RgbaImage};
use img_hash::{HashAlg, HasherConfig, ImageHash};

/// ハッシュの一辺（ビット数は二乗）
const HASH_SIZE: u32 = 8;
/// ハッシュのビット数
pub const FINGERPRINT_BITS: u32 = HASH_SIZE * HASH_SIZE;

const FINGERPRINT_ALPHABET: Alphabet =
    match Alphabet::new("0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_-") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("invalid fingerprint alphabet"),
    };

const FINGERPRINT_ENGINE: GeneralPurpose = GeneralPurpose::new(&FINGERPRINT_ALPHABET, NO_PAD);

/// 全ビット0のハッシュのバイト列
const ZERO_HASH: [u8; (FINGERPRINT_BITS / 8) as usize] = [0; (FINGERPRINT_BITS / 8) as usize];

/// 全ビット0のフィンガープリント（空タイル用に予約）
pub const EMPTY_FINGERPRINT: &str = "00000000000";

/// 画像のDCTハッシュを計算（`None`は全ビット0）
pub fn dct_hash(image: &RgbaImage) -> Option<ImageHash> {
    let rgb = premultiply_onto_black(image);
    if is_uniform(&rgb) {
        return None;
    }

    let hasher = HasherConfig::new()
        .hash_size(HASH_SIZE, HASH_SIZE)
        .hash_alg(HashAlg::Mean)
        .preproc_dct()
        .to_hasher();

    // img_hashは別バージョンのimageクレートを使うため生バッファで受け渡す
    let buffer =
        img_hash::image::ImageBuffer::from_raw(rgb.width(), rgb.height(), rgb.into_raw())?;
    let hash = hasher.hash_image(&img_hash::image::DynamicImage::ImageRgb8(buffer));

    if hash.as_bytes().iter().all(|&byte| byte == 0) {
        None
    } else {
        Some(hash)
    }
}

/// ハッシュを11文字の文字列に変換
pub fn encode_fingerprint(hash: Option<&ImageHash>) -> String {
    match hash {
        Some(hash) => FINGERPRINT_ENGINE.encode(hash.as_bytes()),
        None => FINGERPRINT_ENGINE.encode(ZERO_HASH),
    }
}

/// 2つのハッシュの正規化ハミング距離（0.0〜1.0）
pub fn normalized_distance(left: Option<&ImageHash>, right: Option<&ImageHash>) -> f64 {
    let bits = match (left, right) {
        (Some(left), Some(right)) => left.dist(right),
        (Some(hash), None) | (None, Some(hash)) => count_ones(hash),
        (None, None) => 0,
    };
    f64::from(bits) / f64::from(FINGERPRINT_BITS)
}

fn count_ones(hash: &ImageHash) -> u32 {
    hash.as_bytes().iter().map(|byte| byte.count_ones()).sum()
}

/// アルファを黒背景に乗算したRGB画像
fn premultiply_onto_black(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let scale = |channel: u8| ((u16::from(channel) * u16::from(a) + 127) / 255) as u8;
        Rgb([scale(r), scale(g), scale(b)])
    })
}

fn is_uniform(image: &RgbImage) -> bool {
    let mut pixels = image.pixels();
    match pixels.next() {
        Some(first) => pixels.all(|pixel| pixel == first),
        None => true,
    }
}
