// 取り込み前のタイル確認
//
// 各タイルは Pending から Accepted か Skipped のどちらかへ一度だけ遷移する。
// 確認は入力順に1枚ずつ行い、前のタイルの判断が確定するまで次へ進まない。

use crate::core::error::TileResult;
use crate::tile::Tile;
use async_trait::async_trait;
use mockall::automock;

pub mod console;
pub mod preview;

pub use console::{AutoAcceptAuditor, ConsoleAuditor};
pub use preview::render_preview;

/// 確認時の判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditDecision {
    /// 取り込む
    Accept,
    /// 取り込まない
    Skip,
    /// タグを追加してから再確認する
    Tag,
}

/// タイルごとの確認状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditState {
    Pending,
    Accepted,
    Skipped,
}

impl AuditState {
    /// 判断を適用した次の状態
    pub fn apply(self, decision: AuditDecision) -> Self {
        match (self, decision) {
            (Self::Pending, AuditDecision::Accept) => Self::Accepted,
            (Self::Pending, AuditDecision::Skip) => Self::Skipped,
            (Self::Pending, AuditDecision::Tag) => Self::Pending,
            (terminal, _) => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// タイル確認の入出力を抽象化するトレイト
#[automock]
#[async_trait]
pub trait TileAuditor: Send + Sync {
    /// タイルを提示して判断を得る
    async fn confirm(&self, tile: &Tile) -> TileResult<AuditDecision>;

    /// 追加するタグを入力してもらう（`defaults`は現在のタグ）
    async fn collect_tags(&self, defaults: &[String]) -> TileResult<Vec<String>>;
}

/// 確認結果
#[derive(Debug, Clone, Default)]
pub struct AuditOutcome {
    pub accepted: Vec<Tile>,
    pub skipped: Vec<Tile>,
}

impl AuditOutcome {
    /// 確認を省略して全タイルを受け入れる
    pub fn accept_all(tiles: Vec<Tile>) -> Self {
        Self {
            accepted: tiles,
            skipped: Vec::new(),
        }
    }
}

/// 確認ワークフロー
pub struct AuditWorkflow<'a, A: TileAuditor + ?Sized> {
    auditor: &'a A,
}

impl<'a, A: TileAuditor + ?Sized> AuditWorkflow<'a, A> {
    pub fn new(auditor: &'a A) -> Self {
        Self { auditor }
    }

    /// 入力順に1枚ずつ確認する
    pub async fn run(&self, tiles: Vec<Tile>) -> TileResult<AuditOutcome> {
        let mut outcome = AuditOutcome::default();
        let total = tiles.len();

        for (position, mut tile) in tiles.into_iter().enumerate() {
            let mut state = AuditState::Pending;
            while !state.is_terminal() {
                let decision = self.auditor.confirm(&tile).await?;
                if decision == AuditDecision::Tag {
                    let defaults: Vec<String> = tile.tags().iter().cloned().collect();
                    let tags = self.auditor.collect_tags(&defaults).await?;
                    tile.merge_tags(tags);
                }
                state = state.apply(decision);
            }

            log::debug!("audit {}/{}: {} -> {:?}", position + 1, total, tile.fingerprint(), state);
            match state {
                AuditState::Accepted => outcome.accepted.push(tile),
                _ => outcome.skipped.push(tile),
            }
        }

        Ok(outcome)
    }
}
