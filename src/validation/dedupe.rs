// 重複タイルの除去
//
// 候補を順に走査し、他の候補と参照タイル（既存シート）の全てと比較する。
// 一度比較した組は順序を問わず記録し、再比較しない。
// 一致した場合は走査順で先の候補が残り、参照タイルは常に残る。
// 前の候補か参照タイルに一致した候補はその時点で走査を止める。
// 後ろの候補に一致した場合は後ろの候補を除去し、走査を続ける。

use crate::core::error::TileResult;
use crate::image_ops::{is_similar, ImageBackend};
use crate::tile::Tile;
use std::collections::HashSet;

/// 重複判定の既定閾値
pub const DEFAULT_DUPE_THRESHOLD: f64 = 0.03;

/// 重複除去の結果
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// 残った候補（入力順）
    pub kept: Vec<Tile>,
    /// 除去された候補と、一致した相手のペア
    pub rejected: Vec<(Tile, Tile)>,
}

#[derive(Debug, Clone)]
pub struct Deduper {
    threshold: f64,
}

impl Default for Deduper {
    fn default() -> Self {
        Self::new(DEFAULT_DUPE_THRESHOLD)
    }
}

impl Deduper {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 2枚のタイルが重複かどうか（サイズが違えば比較しない）
    pub fn is_duplicate<I: ImageBackend + ?Sized>(
        &self,
        backend: &I,
        a: &Tile,
        b: &Tile,
    ) -> TileResult<bool> {
        if a.dimensions() != b.dimensions() {
            return Ok(false);
        }
        is_similar(backend, a.pixels(), b.pixels(), self.threshold)
    }

    /// 候補から重複を取り除く
    pub fn dedupe<I: ImageBackend + ?Sized>(
        &self,
        backend: &I,
        candidates: Vec<Tile>,
        reference: &[Tile],
    ) -> TileResult<DedupOutcome> {
        let count = candidates.len();
        // 候補の後ろに参照タイルを並べた比較対象
        let pool: Vec<&Tile> = candidates.iter().chain(reference.iter()).collect();
        let total = pool.len();

        let mut compared: HashSet<(usize, usize)> = HashSet::new();
        let mut matched_with: Vec<Option<usize>> = vec![None; count];

        for i in 0..count {
            if matched_with[i].is_some() {
                continue;
            }

            for j in 0..total {
                if j == i {
                    continue;
                }
                // 後ろの除去済み候補は結果に影響しない
                if j > i && j < count && matched_with[j].is_some() {
                    continue;
                }
                if !compared.insert((i.min(j), i.max(j))) {
                    continue;
                }
                if !self.is_duplicate(backend, pool[i], pool[j])? {
                    continue;
                }

                if j < i || j >= count {
                    matched_with[i] = Some(j);
                    break;
                }
                matched_with[j] = Some(i);
            }
        }

        log::debug!(
            "dedupe: {} candidates, {} reference tiles, {} comparisons",
            count,
            reference.len(),
            compared.len()
        );

        let partners: Vec<Option<Tile>> = matched_with
            .iter()
            .map(|matched| matched.map(|j| pool[j].clone()))
            .collect();

        let mut outcome = DedupOutcome::default();
        for (tile, partner) in candidates.into_iter().zip(partners) {
            match partner {
                Some(partner) => outcome.rejected.push((tile, partner)),
                None => outcome.kept.push(tile),
            }
        }
        Ok(outcome)
    }
}
