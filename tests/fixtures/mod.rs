// テスト用の画像生成とエンジン構築ヘルパー

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tile_sheet::audit::AutoAcceptAuditor;
use tile_sheet::config::AppConfig;
use tile_sheet::engine::TileSheetEngine;
use tile_sheet::image_ops::standard::StandardImageBackend;
use tile_sheet::reporting::NoOpImportReporter;
use tile_sheet::store::JsonLinesDocumentStore;

pub type FileEngine = TileSheetEngine<
    StandardImageBackend,
    JsonLinesDocumentStore,
    AutoAcceptAuditor,
    NoOpImportReporter,
>;

/// 白黒の市松模様
pub fn checker(size: u32, cell: u32, inverted: bool) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let dark = ((x / cell + y / cell) % 2 == 0) != inverted;
        if dark {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

/// 64x64シートの4象限（行優先）。全て異なるフィンガープリントになる
pub fn quadrants() -> [RgbaImage; 4] {
    [
        checker(32, 16, false),
        checker(32, 8, false),
        checker(32, 4, false),
        checker(32, 8, true),
    ]
}

pub fn quadrant_sheet() -> RgbaImage {
    let mut sheet = RgbaImage::new(64, 64);
    for (i, quadrant) in quadrants().iter().enumerate() {
        let (ox, oy) = ((i as i64 % 2) * 32, (i as i64 / 2) * 32);
        image::imageops::replace(&mut sheet, quadrant, ox, oy);
    }
    sheet
}

/// 4象限が単色の64x64シート。単色タイルは全て同じフィンガープリントになる
pub fn solid_quadrants() -> [Rgba<u8>; 4] {
    [
        Rgba([255, 0, 0, 255]),
        Rgba([0, 255, 0, 255]),
        Rgba([0, 0, 255, 255]),
        Rgba([255, 255, 0, 255]),
    ]
}

pub fn solid_quadrant_sheet() -> RgbaImage {
    let colours = solid_quadrants();
    RgbaImage::from_fn(64, 64, |x, y| colours[(x / 32 + (y / 32) * 2) as usize])
}

pub fn write_png(path: &Path, image: &RgbaImage) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image.save(path).unwrap();
}

/// 一時ディレクトリ内に設定ファイル・DB・出力先をまとめたテスト環境
pub struct TestEnv {
    pub dir: TempDir,
    pub config_path: PathBuf,
    pub config: AppConfig,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            db_path: dir.path().join("db"),
            output_path: dir.path().join("out"),
            ..AppConfig::default()
        };
        let config_path = dir.path().join("config.json");
        config.save(&config_path).await.unwrap();

        Self {
            dir,
            config_path,
            config,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn output(&self) -> PathBuf {
        self.config.output_path.clone()
    }

    /// シート画像を `src/<name>` に書き出してパスを返す
    pub fn source_image(&self, name: &str, image: &RgbaImage) -> PathBuf {
        let path = self.path().join("src").join(name);
        write_png(&path, image);
        path
    }

    /// DBファイルを開き直したエンジン
    pub async fn open_engine(&self, inspection_dir: Option<PathBuf>) -> FileEngine {
        let store = JsonLinesDocumentStore::open(self.config.db_file())
            .await
            .unwrap();
        TileSheetEngine::new(
            StandardImageBackend::new(),
            store,
            AutoAcceptAuditor::new(),
            NoOpImportReporter::new(),
            self.config.engine_config().with_inspection_dir(inspection_dir),
        )
    }
}
