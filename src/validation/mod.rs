// 取り込み前のタイル検証（空タイル除去と重複除去）

use crate::core::error::TileResult;
use crate::image_ops::ImageBackend;
use crate::tile::Tile;

pub mod dedupe;
pub mod empty;

pub use dedupe::{DedupOutcome, Deduper, DEFAULT_DUPE_THRESHOLD};
pub use empty::{EmptyFilter, FilterOutcome, DEFAULT_EMPTY_THRESHOLD};

/// 検証結果
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// 取り込み対象として残ったタイル
    pub kept: Vec<Tile>,
    /// 空と判定されたタイル
    pub empty: Vec<Tile>,
    /// 重複と判定されたタイルと一致相手
    pub duplicates: Vec<(Tile, Tile)>,
}

/// 空タイルを除き、残りを候補同士・既存タイルと突き合わせて重複を除く
pub fn reject_invalid<I: ImageBackend + ?Sized>(
    backend: &I,
    tiles: Vec<Tile>,
    reference: &[Tile],
    empty_threshold: f64,
    dupe_threshold: f64,
) -> TileResult<ValidationOutcome> {
    let filtered = EmptyFilter::new(empty_threshold).filter(backend, tiles)?;
    let deduped = Deduper::new(dupe_threshold).dedupe(backend, filtered.kept, reference)?;

    Ok(ValidationOutcome {
        kept: deduped.kept,
        empty: filtered.rejected,
        duplicates: deduped.rejected,
    })
}
