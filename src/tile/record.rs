// 永続化用のタイルレコード
//
// 形式: {sheetName, width, height, tags, index, hash, imageData}
// imageDataはPNGのbase64。未知のフィールドや欠けたフィールドはストアエラーとする。

use super::{normalize_tags, validate_sheet_name, Tile};
use crate::core::error::{TileError, TileResult};
use crate::image_ops::ImageBackend;
use crate::store::Document;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use serde::{Deserialize, Deserializer, Serialize};

/// レコードのフィールド名
pub mod fields {
    pub const SHEET_NAME: &str = "sheetName";
    pub const INDEX: &str = "index";
    pub const HASH: &str = "hash";
    pub const TAGS: &str = "tags";
}

/// 旧形式のデータURIプレフィックス
const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// ストアに保存されるタイル1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TileRecord {
    pub sheet_name: String,
    pub width: u32,
    pub height: u32,
    pub tags: Vec<String>,
    /// キーは必須（値はnull可）
    #[serde(deserialize_with = "required_option")]
    pub index: Option<u32>,
    pub hash: String,
    pub image_data: String,
}

impl TileRecord {
    /// タイルをレコードに変換（画素はPNGでエンコード）
    pub fn from_tile<I: ImageBackend + ?Sized>(backend: &I, tile: &Tile) -> TileResult<Self> {
        let png = backend.encode(tile.pixels(), ImageFormat::Png)?;

        Ok(Self {
            sheet_name: tile.sheet_name().to_string(),
            width: tile.width(),
            height: tile.height(),
            tags: tile.tags().iter().cloned().collect(),
            index: tile.index(),
            hash: tile.fingerprint().to_string(),
            image_data: STANDARD.encode(png),
        })
    }

    /// レコードからタイルを復元
    pub fn into_tile<I: ImageBackend + ?Sized>(self, backend: &I) -> TileResult<Tile> {
        validate_sheet_name(&self.sheet_name)
            .map_err(|_| TileError::store("レコードのsheetNameが空です"))?;

        let encoded = self
            .image_data
            .strip_prefix(PNG_DATA_URI_PREFIX)
            .unwrap_or(&self.image_data);
        let png = STANDARD
            .decode(encoded)
            .map_err(|e| TileError::store(format!("imageDataのbase64が不正です: {e}")))?;

        let source_name = format!("{}#{}", self.sheet_name, self.hash);
        let pixels = backend.decode(&png, &source_name)?;

        if pixels.dimensions() != (self.width, self.height) {
            return Err(TileError::store(format!(
                "レコードのサイズ {}x{} と画像のサイズ {}x{} が一致しません",
                self.width,
                self.height,
                pixels.width(),
                pixels.height()
            )));
        }

        Ok(Tile::from_parts(
            pixels,
            self.sheet_name,
            normalize_tags(self.tags),
            self.hash,
            self.index,
        ))
    }

    /// ストア用ドキュメントに変換
    pub fn to_document(&self) -> TileResult<Document> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(document) => Ok(document),
            _ => Err(TileError::store("レコードがオブジェクトに変換できません")),
        }
    }

    /// ストアのドキュメントからレコードを読み込む（形式を検証）
    pub fn from_document(document: Document) -> TileResult<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(document))?)
    }
}

/// Option型でもキーの欠落を許さない
fn required_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}
