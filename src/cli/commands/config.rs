use super::load_config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// configコマンドで変更する項目
#[derive(Debug, Default)]
pub struct ConfigChanges {
    pub db_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub empty_threshold: Option<f64>,
    pub dupe_threshold: Option<f64>,
    pub clear_output: Option<bool>,
    pub fingerprint_in_filenames: Option<bool>,
}

impl ConfigChanges {
    fn is_empty(&self) -> bool {
        self.db_path.is_none()
            && self.output_path.is_none()
            && self.empty_threshold.is_none()
            && self.dupe_threshold.is_none()
            && self.clear_output.is_none()
            && self.fingerprint_in_filenames.is_none()
    }
}

fn check_threshold(name: &str, value: Option<f64>) -> Result<()> {
    if let Some(value) = value {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("{name} は 0.0〜1.0 の範囲で指定してください: {value}");
        }
    }
    Ok(())
}

/// 永続設定を変更する（変更がなければ現在の設定を表示）
pub async fn execute_config(config_path: &Path, changes: ConfigChanges) -> Result<()> {
    check_threshold("empty-threshold", changes.empty_threshold)?;
    check_threshold("dupe-threshold", changes.dupe_threshold)?;

    let mut config = load_config(config_path).await?;

    if changes.is_empty() {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if let Some(db_path) = changes.db_path {
        let old_file = config.db_file();
        let moved = config.move_db(db_path).await?;
        if moved {
            println!(
                "🚚 Moving DB from {} to {}",
                old_file.display(),
                config.db_file().display()
            );
        }
        println!("✅ Set DB path to {}", config.db_path.display());
    }
    if let Some(output_path) = changes.output_path {
        config.output_path = output_path;
        println!("✅ Set default output path to {}", config.output_path.display());
    }
    if let Some(threshold) = changes.empty_threshold {
        config.empty_threshold = threshold;
        println!("✅ Set empty threshold to {threshold}");
    }
    if let Some(threshold) = changes.dupe_threshold {
        config.dupe_threshold = threshold;
        println!("✅ Set dupe threshold to {threshold}");
    }
    if let Some(clear) = changes.clear_output {
        config.clear_output = clear;
        println!("✅ Set clear output to {clear}");
    }
    if let Some(enable) = changes.fingerprint_in_filenames {
        config.fingerprint_in_filenames = enable;
        println!("✅ Set fingerprint in filenames to {enable}");
    }

    config
        .save(config_path)
        .await
        .with_context(|| format!("設定ファイルを保存できません: {}", config_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_execute_config_updates_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        execute_config(
            &config_path,
            ConfigChanges {
                output_path: Some(temp_dir.path().join("out")),
                dupe_threshold: Some(0.1),
                ..ConfigChanges::default()
            },
        )
        .await
        .unwrap();

        let config = AppConfig::load_or_create(&config_path).await.unwrap();
        assert_eq!(config.output_path, temp_dir.path().join("out"));
        assert_eq!(config.dupe_threshold, 0.1);
        assert_eq!(config.empty_threshold, AppConfig::default().empty_threshold);
    }

    #[tokio::test]
    async fn test_execute_config_moves_db() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let initial = AppConfig {
            db_path: temp_dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        initial.save(&config_path).await.unwrap();
        std::fs::write(initial.db_file(), "").unwrap();

        let new_dir = temp_dir.path().join("db");
        execute_config(
            &config_path,
            ConfigChanges {
                db_path: Some(new_dir.clone()),
                ..ConfigChanges::default()
            },
        )
        .await
        .unwrap();

        assert!(!initial.db_file().exists());
        assert!(new_dir.join("tiledb").exists());
        let config = AppConfig::load_or_create(&config_path).await.unwrap();
        assert_eq!(config.db_path, new_dir);
    }

    #[tokio::test]
    async fn test_execute_config_rejects_bad_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let result = execute_config(
            &config_path,
            ConfigChanges {
                empty_threshold: Some(1.5),
                ..ConfigChanges::default()
            },
        )
        .await;

        assert!(result.is_err());
        assert!(!config_path.exists());
    }
}
