// 設定管理
//
// AppConfig は CLI が読み書きする永続設定（JSONファイル）。
// EngineConfig はエンジン構築時に渡す実行時設定。

use crate::core::error::{TileError, TileResult};
use crate::validation::{DEFAULT_DUPE_THRESHOLD, DEFAULT_EMPTY_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ファイルの既定パス
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";
/// データベースファイルの既定名
pub const DEFAULT_DB_FILE_NAME: &str = "tiledb";

/// 永続設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    #[serde(rename = "DBPath")]
    pub db_path: PathBuf,
    #[serde(rename = "DBFileName")]
    pub db_file_name: String,
    pub output_path: PathBuf,
    pub empty_threshold: f64,
    pub dupe_threshold: f64,
    pub clear_output: bool,
    pub fingerprint_in_filenames: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./"),
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            output_path: PathBuf::from("./tiles"),
            empty_threshold: DEFAULT_EMPTY_THRESHOLD,
            dupe_threshold: DEFAULT_DUPE_THRESHOLD,
            clear_output: false,
            fingerprint_in_filenames: false,
        }
    }
}

impl AppConfig {
    /// 設定ファイルを読み込む（存在しなければ既定値で作成）
    pub async fn load_or_create(path: impl AsRef<Path>) -> TileResult<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                TileError::store(format!("設定ファイルが不正です: {} - {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("creating default config at {}", path.display());
                let config = Self::default();
                config.save(path).await?;
                Ok(config)
            }
            Err(e) => Err(TileError::io(path.display().to_string(), e)),
        }
    }

    /// 設定ファイルに保存
    pub async fn save(&self, path: impl AsRef<Path>) -> TileResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| TileError::io(path.display().to_string(), e))
    }

    /// データベースファイルのパス
    pub fn db_file(&self) -> PathBuf {
        self.db_path.join(&self.db_file_name)
    }

    /// データベースの置き場所を変更し、既存ファイルがあれば移動する
    ///
    /// 移動した場合は`true`、移動元が存在しなかった場合は`false`を返す。
    pub async fn move_db(&mut self, new_dir: impl Into<PathBuf>) -> TileResult<bool> {
        let new_dir = new_dir.into();
        let old_file = self.db_file();
        let new_file = new_dir.join(&self.db_file_name);

        tokio::fs::create_dir_all(&new_dir)
            .await
            .map_err(|e| TileError::io(new_dir.display().to_string(), e))?;

        let moved = match tokio::fs::rename(&old_file, &new_file).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(TileError::io(old_file.display().to_string(), e)),
        };

        self.db_path = new_dir;
        Ok(moved)
    }

    /// エンジン設定を作る
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_empty_threshold(self.empty_threshold)
            .with_dupe_threshold(self.dupe_threshold)
            .with_clear_output(self.clear_output)
            .with_fingerprint_in_filenames(self.fingerprint_in_filenames)
    }
}

/// エンジンの実行時設定
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    empty_threshold: f64,
    dupe_threshold: f64,
    inspection_dir: Option<PathBuf>,
    clear_output: bool,
    fingerprint_in_filenames: bool,
    max_concurrent_writes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl EngineConfig {
    pub fn new(cpu_count: usize) -> Self {
        Self {
            empty_threshold: DEFAULT_EMPTY_THRESHOLD,
            dupe_threshold: DEFAULT_DUPE_THRESHOLD,
            inspection_dir: None,
            clear_output: false,
            fingerprint_in_filenames: false,
            max_concurrent_writes: cpu_count.max(1) * 2,
        }
    }

    pub fn with_empty_threshold(mut self, threshold: f64) -> Self {
        self.empty_threshold = threshold;
        self
    }

    pub fn with_dupe_threshold(mut self, threshold: f64) -> Self {
        self.dupe_threshold = threshold;
        self
    }

    /// 除外タイルの書き出し先（`Empty/`, `Dupes/`, `Skipped/`）
    pub fn with_inspection_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.inspection_dir = dir;
        self
    }

    pub fn with_clear_output(mut self, clear: bool) -> Self {
        self.clear_output = clear;
        self
    }

    pub fn with_fingerprint_in_filenames(mut self, enable: bool) -> Self {
        self.fingerprint_in_filenames = enable;
        self
    }

    pub fn with_max_concurrent_writes(mut self, max: usize) -> Self {
        self.max_concurrent_writes = max.max(1);
        self
    }

    pub fn empty_threshold(&self) -> f64 {
        self.empty_threshold
    }

    pub fn dupe_threshold(&self) -> f64 {
        self.dupe_threshold
    }

    pub fn inspection_dir(&self) -> Option<&Path> {
        self.inspection_dir.as_deref()
    }

    pub fn clear_output(&self) -> bool {
        self.clear_output
    }

    pub fn fingerprint_in_filenames(&self) -> bool {
        self.fingerprint_in_filenames
    }

    pub fn max_concurrent_writes(&self) -> usize {
        self.max_concurrent_writes
    }
}
