// 取り込み・書き出しの進捗報告

use crate::core::types::{ExportSummary, ImportSummary};
use async_trait::async_trait;
use mockall::automock;

/// 進捗報告を抽象化するトレイト
#[automock]
#[async_trait]
pub trait ImportReporter: Send + Sync {
    /// シートの取り込み開始
    async fn report_started(&self, sheet_name: &str, sources: usize);

    /// 切り出し完了
    async fn report_sliced(&self, tiles: usize);

    /// 検証で除外されたタイル数
    async fn report_rejected(&self, empty: usize, duplicates: usize);

    /// 読み込み・書き込みに失敗したソース
    async fn report_error(&self, source: &str, error: &str);

    /// 取り込み完了
    async fn report_completed(&self, sheet_name: &str, summary: &ImportSummary);

    /// 書き出し完了
    async fn report_exported(&self, summary: &ExportSummary);
}

/// コンソール出力による進捗報告実装
#[derive(Debug, Default, Clone)]
pub struct ConsoleImportReporter {
    quiet: bool,
}

impl ConsoleImportReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

#[async_trait]
impl ImportReporter for ConsoleImportReporter {
    async fn report_started(&self, sheet_name: &str, sources: usize) {
        if !self.quiet {
            println!("🚀 Importing {sources} source image(s) into '{sheet_name}'...");
        }
    }

    async fn report_sliced(&self, tiles: usize) {
        if !self.quiet {
            println!("✂️  Sliced {tiles} tiles");
        }
    }

    async fn report_rejected(&self, empty: usize, duplicates: usize) {
        if !self.quiet {
            println!("🧹 Removed {empty} empty tiles and {duplicates} dupes");
        }
    }

    async fn report_error(&self, source: &str, error: &str) {
        if !self.quiet {
            eprintln!("❌ Error processing {source}: {error}");
        }
    }

    async fn report_completed(&self, sheet_name: &str, summary: &ImportSummary) {
        if !self.quiet {
            println!(
                "✅ Imported {} tiles into '{}' (merged: {}, skipped: {})",
                summary.inserted, sheet_name, summary.merged, summary.skipped
            );
        }
    }

    async fn report_exported(&self, summary: &ExportSummary) {
        if !self.quiet {
            println!(
                "💾 Wrote {} tiles from {} sheet(s)",
                summary.written, summary.sheets
            );
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpImportReporter;

impl NoOpImportReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ImportReporter for NoOpImportReporter {
    async fn report_started(&self, _sheet_name: &str, _sources: usize) {}

    async fn report_sliced(&self, _tiles: usize) {}

    async fn report_rejected(&self, _empty: usize, _duplicates: usize) {}

    async fn report_error(&self, _source: &str, _error: &str) {}

    async fn report_completed(&self, _sheet_name: &str, _summary: &ImportSummary) {}

    async fn report_exported(&self, _summary: &ExportSummary) {}
}
