use crate::core::error::{TileError, TileResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 取り込み元の画像ファイルを列挙する
pub struct SourceScanner;

impl SourceScanner {
    /// ファイルはそのまま、ディレクトリは再帰的に画像ファイルを名前順で列挙する
    pub fn collect(paths: &[PathBuf]) -> TileResult<Vec<PathBuf>> {
        let mut sources = Vec::new();

        for path in paths {
            let metadata = std::fs::metadata(path)
                .map_err(|e| TileError::io(path.display().to_string(), e))?;

            if metadata.is_dir() {
                sources.extend(Self::scan_directory(path)?);
            } else {
                sources.push(path.clone());
            }
        }

        Ok(sources)
    }

    /// ディレクトリ以下の画像ファイル（拡張子で判定）
    pub fn scan_directory(directory: &Path) -> TileResult<Vec<PathBuf>> {
        let mut file_paths = Vec::new();

        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry =
                entry.map_err(|e| TileError::io(directory.display().to_string(), e.into()))?;

            if entry.file_type().is_file() && Self::has_image_extension(entry.path()) {
                file_paths.push(entry.into_path());
            } else if entry.file_type().is_file() {
                log::debug!("skipping non-image {}", entry.path().display());
            }
        }

        Ok(file_paths)
    }

    fn has_image_extension(path: &Path) -> bool {
        let Some(extension) = path.extension() else {
            return false;
        };
        matches!(
            extension.to_string_lossy().to_lowercase().as_str(),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" | "tga" | "ico"
        )
    }
}
