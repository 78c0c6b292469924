use super::{build_engine, load_config};
use crate::audit::AutoAcceptAuditor;
use crate::reporting::NoOpImportReporter;
use anyhow::Result;
use std::path::Path;

/// インデックスまたはフィンガープリントでタイルを削除する
pub async fn execute_remove(
    config_path: &Path,
    name: &str,
    indices: &[u32],
    fingerprints: &[String],
) -> Result<()> {
    if indices.is_empty() && fingerprints.is_empty() {
        anyhow::bail!("削除するインデックスか --hash を指定してください");
    }

    let app_config = load_config(config_path).await?;
    let mut engine = build_engine(
        &app_config,
        AutoAcceptAuditor::new(),
        NoOpImportReporter::new(),
        None,
    )
    .await?;

    let outcome = engine.remove_tiles(name, indices, fingerprints).await?;

    for index in &outcome.removed {
        println!("🗑️  Removed tile {index} from {name}");
    }
    for index in &outcome.missing {
        println!("⚠️  Couldn't find a tile matching {index} for {name}");
    }
    Ok(())
}
