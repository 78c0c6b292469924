use super::{build_engine, load_config};
use crate::audit::console::{ConsoleAuditor, DEFAULT_PREVIEW_COLUMNS};
use crate::core::types::ImportOptions;
use crate::reporting::ConsoleImportReporter;
use anyhow::Result;
use std::path::PathBuf;

/// 除外タイルを書き出す出力先内のディレクトリ名
pub const REJECTED_DIR_NAME: &str = "Rejected";

/// addコマンドの引数
pub struct AddConfig {
    pub config_path: PathBuf,
    pub src: PathBuf,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub output_path: Option<PathBuf>,
    pub tags: Vec<String>,
    pub skip_validation: bool,
    pub skip_audit: bool,
    pub preview: bool,
    pub quiet: bool,
}

/// タイルシート画像を切り出してDBに追加する
pub async fn execute_add(config: AddConfig) -> Result<()> {
    if !config.src.exists() {
        anyhow::bail!("Source does not exist: {}", config.src.display());
    }

    let app_config = load_config(&config.config_path).await?;

    // 出力先は引数 > 設定ファイルの順
    let output = config
        .output_path
        .clone()
        .unwrap_or_else(|| app_config.output_path.clone());

    let preview_columns = config.preview.then_some(DEFAULT_PREVIEW_COLUMNS);
    let auditor = ConsoleAuditor::stdio().with_preview_columns(preview_columns);
    let reporter = if config.quiet {
        ConsoleImportReporter::quiet()
    } else {
        ConsoleImportReporter::new()
    };
    let mut engine = build_engine(
        &app_config,
        auditor,
        reporter,
        Some(output.join(REJECTED_DIR_NAME)),
    )
    .await?;

    if !config.quiet {
        println!("🧩 タイルシート取り込み - addコマンド");
        println!("📂 ソース: {}", config.src.display());
        println!("🏷️  シート: {}", config.name);
        println!("📐 タイルサイズ: {}x{}", config.tile_width, config.tile_height);
        println!("📁 出力先: {}", output.display());
    }

    let options = ImportOptions::new()
        .with_skip_validation(config.skip_validation)
        .with_skip_audit(config.skip_audit)
        .with_export_path(&output)
        .with_tags(config.tags);

    let summary = engine
        .import_paths(
            &[config.src],
            &config.name,
            config.tile_width,
            config.tile_height,
            &options,
        )
        .await?;

    if !config.quiet {
        println!("\n📊 取り込み結果:");
        println!("   - 切り出したタイル数: {}", summary.sliced);
        println!("   - 空タイル: {}", summary.empty_rejected);
        println!("   - 重複タイル: {}", summary.duplicates_rejected);
        println!("   - スキップ: {}", summary.skipped);
        println!("   - 追加: {}", summary.inserted);
        println!("   - タグをマージ: {}", summary.merged);
        if let Some(exported) = summary.exported {
            println!("   - 書き出し: {exported}");
        }
        if summary.failed_sources > 0 {
            println!("⚠️  {}個のファイルを読み込めませんでした", summary.failed_sources);
        }
    }

    Ok(())
}
