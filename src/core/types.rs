// エンジンの入出力に関するデータ型定義

use std::path::PathBuf;

/// 取り込みオプション
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOptions {
    /// 空タイル・重複の検証を省略する
    pub skip_validation: bool,
    /// 対話的な確認を省略し、全タイルを受け入れる
    pub skip_audit: bool,
    /// 取り込み後にシートを書き出すディレクトリ
    pub export_path: Option<PathBuf>,
    /// 全タイルに付与するタグ
    pub tags: Vec<String>,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    pub fn with_skip_audit(mut self, skip: bool) -> Self {
        self.skip_audit = skip;
        self
    }

    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = Some(path.into());
        self
    }

    pub fn with_tags<T, S>(mut self, tags: T) -> Self
    where
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// 取り込み全体のサマリー
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// 読み込めなかったソースの数
    pub failed_sources: usize,
    /// 切り出したタイル数
    pub sliced: usize,
    /// 空として除外した数
    pub empty_rejected: usize,
    /// 重複として除外した数
    pub duplicates_rejected: usize,
    /// 確認でスキップした数
    pub skipped: usize,
    /// 新規に挿入した数
    pub inserted: usize,
    /// 既存レコードにタグをマージした数
    pub merged: usize,
    /// 書き出したファイル数（書き出しを行った場合）
    pub exported: Option<usize>,
}

/// 削除結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// 削除したインデックス（昇順）
    pub removed: Vec<u32>,
    /// 存在しなかったインデックス（昇順）
    pub missing: Vec<u32>,
}

/// 書き出し結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// 書き出したシート数
    pub sheets: usize,
    /// 書き出したファイル数
    pub written: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_options_builder() {
        let options = ImportOptions::new()
            .with_skip_validation(true)
            .with_skip_audit(true)
            .with_export_path("/tmp/out")
            .with_tags(["grass", "ground"]);

        assert!(options.skip_validation);
        assert!(options.skip_audit);
        assert_eq!(options.export_path, Some(PathBuf::from("/tmp/out")));
        assert_eq!(options.tags, vec!["grass", "ground"]);
    }

    #[test]
    fn test_import_options_default() {
        let options = ImportOptions::default();

        assert!(!options.skip_validation);
        assert!(!options.skip_audit);
        assert!(options.export_path.is_none());
        assert!(options.tags.is_empty());
    }

    #[test]
    fn test_summaries_default_to_zero() {
        let summary = ImportSummary::default();
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.exported, None);

        let removal = RemovalOutcome::default();
        assert!(removal.removed.is_empty() && removal.missing.is_empty());
    }
}
