// タイルシートエンジン
//
// 切り出し → 検証 → 確認 → インデックス割り当て → 保存 → 書き出し の順に処理する。
// 順序に依存する処理は呼び出し元のタスクで逐次に行い、除外タイルと
// 書き出しファイルの書き込みだけをJoinSetで並行に実行する。

use crate::audit::{AuditOutcome, AuditWorkflow, TileAuditor};
use crate::config::EngineConfig;
use crate::core::error::{TileError, TileResult};
use crate::core::types::{ExportSummary, ImportOptions, ImportSummary, RemovalOutcome};
use crate::image_ops::ImageBackend;
use crate::index::IndexAllocator;
use crate::reporting::ImportReporter;
use crate::slicer;
use crate::source_scanner::SourceScanner;
use crate::store::{DocumentStore, Filter};
use crate::tile::{fields, validate_sheet_name, Tile, TileRecord};
use crate::validation::reject_invalid;
use image::{ImageFormat, RgbaImage};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// 除外タイルの書き出し先サブディレクトリ
const EMPTY_DIR: &str = "Empty";
const DUPES_DIR: &str = "Dupes";
const SKIPPED_DIR: &str = "Skipped";

/// タイルシートの取り込み・書き出し・削除を行うエンジン
pub struct TileSheetEngine<I, S, A, R>
where
    I: ImageBackend + 'static,
    S: DocumentStore,
    A: TileAuditor,
    R: ImportReporter,
{
    backend: Arc<I>,
    store: S,
    auditor: A,
    reporter: R,
    config: EngineConfig,
}

impl<I, S, A, R> TileSheetEngine<I, S, A, R>
where
    I: ImageBackend + 'static,
    S: DocumentStore,
    A: TileAuditor,
    R: ImportReporter,
{
    pub fn new(backend: I, store: S, auditor: A, reporter: R, config: EngineConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            store,
            auditor,
            reporter,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn backend(&self) -> &I {
        &self.backend
    }

    /// シートの全タイルをインデックス順に取得
    pub async fn list_sheet(&self, sheet_name: &str) -> TileResult<Vec<Tile>> {
        validate_sheet_name(sheet_name)?;
        self.load_tiles(Some(sheet_name)).await
    }

    /// 画像を切り出してシートに取り込む
    pub async fn import_sheet(
        &mut self,
        sources: Vec<RgbaImage>,
        sheet_name: &str,
        tile_width: u32,
        tile_height: u32,
        options: &ImportOptions,
    ) -> TileResult<ImportSummary> {
        validate_sheet_name(sheet_name)?;
        if tile_width == 0 || tile_height == 0 {
            return Err(TileError::invalid_geometry(tile_width, tile_height));
        }

        self.reporter.report_started(sheet_name, sources.len()).await;
        let mut summary = ImportSummary::default();

        // 1. 既存タイル（参照セット）
        let reference = self.load_tiles(Some(sheet_name)).await?;

        // 2. 切り出し
        let mut tiles = Vec::new();
        for source in &sources {
            tiles.extend(slicer::slice(
                self.backend.as_ref(),
                source,
                sheet_name,
                tile_width,
                tile_height,
                &options.tags,
            )?);
        }
        summary.sliced = tiles.len();
        self.reporter.report_sliced(tiles.len()).await;

        // 3. 検証
        let candidates = if options.skip_validation {
            tiles
        } else {
            let outcome = reject_invalid(
                self.backend.as_ref(),
                tiles,
                &reference,
                self.config.empty_threshold(),
                self.config.dupe_threshold(),
            )?;
            summary.empty_rejected = outcome.empty.len();
            summary.duplicates_rejected = outcome.duplicates.len();
            self.reporter
                .report_rejected(outcome.empty.len(), outcome.duplicates.len())
                .await;
            self.write_rejected(&outcome.empty, &outcome.duplicates)
                .await?;
            outcome.kept
        };

        // 4. 確認
        let audited = if options.skip_audit {
            AuditOutcome::accept_all(candidates)
        } else {
            AuditWorkflow::new(&self.auditor).run(candidates).await?
        };
        summary.skipped = audited.skipped.len();
        self.write_skipped(&audited.skipped).await?;

        // 5. 1枚ずつ保存（取り込み前から同じフィンガープリントがあればタグをマージ）
        let existing: HashSet<&str> = reference.iter().map(Tile::fingerprint).collect();
        let allocator = IndexAllocator::new(&self.store);
        for mut tile in audited.accepted {
            if existing.contains(tile.fingerprint())
                && allocator
                    .merge_tags(sheet_name, tile.fingerprint(), tile.tags())
                    .await?
            {
                summary.merged += 1;
            } else {
                allocator.append(self.backend.as_ref(), &mut tile).await?;
                summary.inserted += 1;
            }
        }
        self.reporter.report_completed(sheet_name, &summary).await;

        // 6. 書き出し
        if let Some(export_path) = &options.export_path {
            let exported = self.export_sheet(export_path, Some(sheet_name)).await?;
            summary.exported = Some(exported.written);
        }

        Ok(summary)
    }

    /// ファイル・ディレクトリから画像を読み込んで取り込む
    ///
    /// 読み込めないファイルは報告してスキップする。
    pub async fn import_paths(
        &mut self,
        paths: &[PathBuf],
        sheet_name: &str,
        tile_width: u32,
        tile_height: u32,
        options: &ImportOptions,
    ) -> TileResult<ImportSummary> {
        let files = SourceScanner::collect(paths)?;
        let mut sources = Vec::with_capacity(files.len());
        let mut failed = 0;

        for file in &files {
            match self.read_source(file).await {
                Ok(image) => sources.push(image),
                Err(e) if e.is_recoverable() => {
                    log::warn!("skipping {}: {}", file.display(), e);
                    self.reporter
                        .report_error(&file.display().to_string(), &e.to_string())
                        .await;
                    failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let mut summary = self
            .import_sheet(sources, sheet_name, tile_width, tile_height, options)
            .await?;
        summary.failed_sources = failed;
        Ok(summary)
    }

    async fn read_source(&self, path: &Path) -> TileResult<RgbaImage> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| TileError::io(path.display().to_string(), e))?;
        self.backend.decode(&data, &path.display().to_string())
    }

    /// インデックスまたはフィンガープリントで指定したタイルを削除する
    pub async fn remove_tiles(
        &mut self,
        sheet_name: &str,
        indices: &[u32],
        fingerprints: &[String],
    ) -> TileResult<RemovalOutcome> {
        validate_sheet_name(sheet_name)?;
        let allocator = IndexAllocator::new(&self.store);

        let mut targets: BTreeSet<u32> = indices.iter().copied().collect();
        if !fingerprints.is_empty() {
            let resolved = allocator
                .resolve_fingerprints(sheet_name, fingerprints)
                .await?;
            if resolved.is_empty() && indices.is_empty() {
                return Err(TileError::not_found(format!(
                    "シート '{}' のフィンガープリント {}",
                    sheet_name,
                    fingerprints.join(", ")
                )));
            }
            targets.extend(resolved);
        }

        let targets: Vec<u32> = targets.into_iter().collect();
        allocator.remove(sheet_name, &targets).await
    }

    /// タイルをPNGファイルとして書き出す（シートを省略すると全シート）
    pub async fn export_sheet(
        &self,
        output: &Path,
        sheet_name: Option<&str>,
    ) -> TileResult<ExportSummary> {
        if let Some(sheet_name) = sheet_name {
            validate_sheet_name(sheet_name)?;
        }

        let mut groups: BTreeMap<String, Vec<Tile>> = BTreeMap::new();
        for tile in self.load_tiles(sheet_name).await? {
            groups
                .entry(tile.sheet_name().to_string())
                .or_default()
                .push(tile);
        }

        let mut jobs = Vec::new();
        for (sheet, tiles) in &groups {
            let dir = output.join(safe_file_stem(sheet));
            if self.config.clear_output() {
                remove_dir_if_exists(&dir).await?;
            }
            for tile in tiles {
                let name = export_file_name(tile, self.config.fingerprint_in_filenames());
                jobs.push((dir.join(name), tile.pixels().clone()));
            }
        }

        let written = self.write_pngs(jobs).await?;
        let summary = ExportSummary {
            sheets: groups.len(),
            written,
        };
        self.reporter.report_exported(&summary).await;
        Ok(summary)
    }

    async fn load_tiles(&self, sheet_name: Option<&str>) -> TileResult<Vec<Tile>> {
        let filter = match sheet_name {
            Some(sheet_name) => Filter::all().eq(fields::SHEET_NAME, sheet_name),
            None => Filter::all(),
        };

        let mut tiles = Vec::new();
        for document in self.store.find(&filter).await? {
            let record = TileRecord::from_document(document)?;
            tiles.push(record.into_tile(self.backend.as_ref())?);
        }
        tiles.sort_by(|a, b| {
            a.sheet_name()
                .cmp(b.sheet_name())
                .then(a.index().cmp(&b.index()))
        });
        Ok(tiles)
    }

    async fn write_rejected(&self, empty: &[Tile], duplicates: &[(Tile, Tile)]) -> TileResult<()> {
        let Some(root) = self.config.inspection_dir() else {
            return Ok(());
        };

        let mut jobs = Vec::new();
        for tile in empty {
            let path = root
                .join(EMPTY_DIR)
                .join(format!("empty-{}.png", tile.fingerprint()));
            jobs.push((path, tile.pixels().clone()));
        }
        for (rejected, kept) in duplicates {
            let rejected_name = rejected.display_name();
            let kept_name = kept.display_name();
            let dir = root
                .join(DUPES_DIR)
                .join(safe_file_stem(rejected.sheet_name()))
                .join(format!("{rejected_name}-{kept_name}"));
            jobs.push((
                dir.join(format!(
                    "reject-{}-{rejected_name}.png",
                    safe_file_stem(rejected.sheet_name())
                )),
                rejected.pixels().clone(),
            ));
            jobs.push((
                dir.join(format!("keep-{}-{kept_name}.png", safe_file_stem(kept.sheet_name()))),
                kept.pixels().clone(),
            ));
        }

        self.write_pngs(jobs).await?;
        Ok(())
    }

    async fn write_skipped(&self, skipped: &[Tile]) -> TileResult<()> {
        let Some(root) = self.config.inspection_dir() else {
            return Ok(());
        };

        let jobs = skipped
            .iter()
            .map(|tile| {
                let path = root
                    .join(SKIPPED_DIR)
                    .join(format!("skipped-{}.png", tile.fingerprint()));
                (path, tile.pixels().clone())
            })
            .collect();

        self.write_pngs(jobs).await?;
        Ok(())
    }

    /// PNGファイルを並行に書き込み、書き込んだファイル数を返す
    ///
    /// 同じパスが複数ある場合は後のものだけを書く。
    async fn write_pngs(&self, jobs: Vec<(PathBuf, RgbaImage)>) -> TileResult<usize> {
        let jobs: BTreeMap<PathBuf, RgbaImage> = jobs.into_iter().collect();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_writes()));
        let mut tasks: JoinSet<TileResult<()>> = JoinSet::new();

        for (path, image) in jobs {
            let backend = Arc::clone(&self.backend);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire().await.map_err(|e| {
                    TileError::io(path.display().to_string(), std::io::Error::other(e))
                })?;

                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| TileError::io(parent.display().to_string(), e))?;
                }

                let bytes =
                    tokio::task::spawn_blocking(move || backend.encode(&image, ImageFormat::Png))
                        .await??;

                tokio::fs::write(&path, bytes)
                    .await
                    .map_err(|e| TileError::io(path.display().to_string(), e))
            });
        }

        let mut written = 0;
        while let Some(result) = tasks.join_next().await {
            result??;
            written += 1;
        }
        Ok(written)
    }
}

/// ファイル名に使えない文字を'-'に置き換える
pub fn safe_file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            stem.push(c);
        } else if !stem.ends_with('-') {
            stem.push('-');
        }
    }

    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "sheet".to_string()
    } else {
        stem.to_string()
    }
}

/// 書き出しファイル名 `<sheet>-<NN>[-<fingerprint>].png`（NNは1始まり2桁）
pub fn export_file_name(tile: &Tile, with_fingerprint: bool) -> String {
    let stem = safe_file_stem(tile.sheet_name());
    let number = match tile.index() {
        Some(index) => format!("{:02}", u64::from(index) + 1),
        None => tile.fingerprint().to_string(),
    };

    if with_fingerprint && tile.index().is_some() {
        format!("{stem}-{number}-{}.png", tile.fingerprint())
    } else {
        format!("{stem}-{number}.png")
    }
}

async fn remove_dir_if_exists(dir: &Path) -> TileResult<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TileError::io(dir.display().to_string(), e)),
    }
}
