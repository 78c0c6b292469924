use super::{build_engine, load_config};
use crate::audit::AutoAcceptAuditor;
use crate::reporting::ConsoleImportReporter;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// DBのタイルをPNGファイルとして書き出す
pub async fn execute_write(
    config_path: &Path,
    output_path: Option<PathBuf>,
    name: Option<String>,
) -> Result<()> {
    let app_config = load_config(config_path).await?;
    let output = output_path.unwrap_or_else(|| app_config.output_path.clone());

    let engine = build_engine(
        &app_config,
        AutoAcceptAuditor::new(),
        ConsoleImportReporter::new(),
        None,
    )
    .await?;

    println!("📁 出力先: {}", output.display());
    let summary = engine.export_sheet(&output, name.as_deref()).await?;

    if summary.written == 0 {
        println!("📭 書き出すタイルがありません");
    }
    Ok(())
}
