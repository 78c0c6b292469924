use crate::core::error::TileResult;
use image::{ImageFormat, RgbaImage};
use mockall::automock;

pub mod diff;
pub mod fingerprint;
pub mod standard;

pub use fingerprint::EMPTY_FINGERPRINT;

/// 画像処理バックエンドのトレイト
///
/// デコード・エンコード・切り出し・知覚ハッシュ・2種類の類似度指標を提供する。
/// 比較系のメソッドは同じサイズの画像同士でのみ定義され、
/// サイズが異なる場合は `TileError::DimensionMismatch` を返す。
#[automock]
pub trait ImageBackend: Send + Sync {
    /// バイト列からRGBA画像をデコード（`source_name`はエラー表示用）
    fn decode(&self, data: &[u8], source_name: &str) -> TileResult<RgbaImage>;

    /// 指定フォーマットでエンコード
    fn encode(&self, image: &RgbaImage, format: ImageFormat) -> TileResult<Vec<u8>>;

    /// 矩形領域を切り出す
    fn crop(&self, image: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage;

    /// 知覚ハッシュ文字列を計算
    fn hash(&self, image: &RgbaImage) -> String;

    /// 正規化された知覚距離（0.0〜1.0）
    fn perceptual_distance(&self, a: &RgbaImage, b: &RgbaImage) -> TileResult<f64>;

    /// 異なるピクセルの割合（0.0〜1.0）
    fn pixel_diff_percent(&self, a: &RgbaImage, b: &RgbaImage) -> TileResult<f64>;

    /// バックエンドの名前を取得
    fn backend_name(&self) -> &'static str {
        "unknown"
    }
}

/// 2つの画像が閾値の下で「同じ」とみなせるかを判定
///
/// 知覚距離とピクセル差分率の両方が閾値未満の場合のみ一致とする。
pub fn is_similar<I: ImageBackend + ?Sized>(
    backend: &I,
    a: &RgbaImage,
    b: &RgbaImage,
    threshold: f64,
) -> TileResult<bool> {
    let distance = backend.perceptual_distance(a, b)?;
    if distance >= threshold {
        return Ok(false);
    }
    let diff = backend.pixel_diff_percent(a, b)?;
    Ok(diff < threshold)
}
