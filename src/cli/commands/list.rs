use super::{build_engine, load_config};
use crate::audit::console::DEFAULT_PREVIEW_COLUMNS;
use crate::audit::{render_preview, AutoAcceptAuditor};
use crate::reporting::NoOpImportReporter;
use anyhow::Result;
use std::path::Path;

/// シートのタイルを一覧表示する
pub async fn execute_list(config_path: &Path, name: &str, preview: bool) -> Result<()> {
    let app_config = load_config(config_path).await?;
    let engine = build_engine(
        &app_config,
        AutoAcceptAuditor::new(),
        NoOpImportReporter::new(),
        None,
    )
    .await?;

    let tiles = engine.list_sheet(name).await?;
    if tiles.is_empty() {
        println!("📭 シート '{name}' にタイルはありません");
        return Ok(());
    }

    println!("📋 シート '{}' のタイル ({}件)", name, tiles.len());
    for tile in &tiles {
        if preview {
            print!("{}", render_preview(tile.pixels(), DEFAULT_PREVIEW_COLUMNS));
        }
        let tags: Vec<&str> = tile.tags().iter().map(String::as_str).collect();
        println!(
            "{:>4}  {}  {}x{}  [{}]",
            tile.display_name(),
            tile.fingerprint(),
            tile.width(),
            tile.height(),
            tags.join(", ")
        );
    }

    Ok(())
}
