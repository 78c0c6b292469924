pub mod add;
pub mod config;
pub mod list;
pub mod remove;
pub mod write;

pub use add::*;
pub use config::*;
pub use list::*;
pub use remove::*;
pub use write::*;

use crate::audit::TileAuditor;
use crate::config::AppConfig;
use crate::engine::TileSheetEngine;
use crate::image_ops::standard::StandardImageBackend;
use crate::reporting::ImportReporter;
use crate::store::JsonLinesDocumentStore;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// CLIで使うエンジンの型
pub type CliEngine<A, R> = TileSheetEngine<StandardImageBackend, JsonLinesDocumentStore, A, R>;

/// 設定ファイルを読み込む（なければ既定値で作成）
pub async fn load_config(config_path: &Path) -> Result<AppConfig> {
    AppConfig::load_or_create(config_path)
        .await
        .with_context(|| format!("設定ファイルを読み込めません: {}", config_path.display()))
}

/// DBを開いてエンジンを構築する
pub async fn build_engine<A, R>(
    app_config: &AppConfig,
    auditor: A,
    reporter: R,
    inspection_dir: Option<PathBuf>,
) -> Result<CliEngine<A, R>>
where
    A: TileAuditor,
    R: ImportReporter,
{
    let db_file = app_config.db_file();
    let store = JsonLinesDocumentStore::open(&db_file)
        .await
        .with_context(|| format!("DBを開けません: {}", db_file.display()))?;

    let engine_config = app_config
        .engine_config()
        .with_inspection_dir(inspection_dir);

    Ok(TileSheetEngine::new(
        StandardImageBackend::new(),
        store,
        auditor,
        reporter,
        engine_config,
    ))
}
