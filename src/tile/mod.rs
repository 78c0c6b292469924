// タイルエンティティ
//
// 画素バッファと、シート名・タグ・フィンガープリント・インデックスを持つ。
// 幅と高さは常に画素バッファから導出するため、両者が食い違うことはない。

use crate::core::error::{TileError, TileResult};
use crate::image_ops::ImageBackend;
use image::RgbaImage;
use std::collections::BTreeSet;

pub mod record;

pub use record::{fields, TileRecord};

/// 切り出された1枚のタイル
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pixels: RgbaImage,
    sheet_name: String,
    tags: BTreeSet<String>,
    fingerprint: String,
    index: Option<u32>,
}

impl Tile {
    /// 画素からタイルを作成し、フィンガープリントを計算する
    pub fn new<I, T, S>(
        backend: &I,
        pixels: RgbaImage,
        sheet_name: impl Into<String>,
        tags: T,
    ) -> TileResult<Self>
    where
        I: ImageBackend + ?Sized,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sheet_name = sheet_name.into();
        validate_sheet_name(&sheet_name)?;
        let fingerprint = backend.hash(&pixels);

        Ok(Self {
            pixels,
            sheet_name,
            tags: normalize_tags(tags),
            fingerprint,
            index: None,
        })
    }

    /// 保存済みの値からタイルを復元する（フィンガープリントは再計算しない）
    pub fn from_parts(
        pixels: RgbaImage,
        sheet_name: String,
        tags: BTreeSet<String>,
        fingerprint: String,
        index: Option<u32>,
    ) -> Self {
        Self {
            pixels,
            sheet_name,
            tags,
            fingerprint,
            index,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn index(&self) -> Option<u32> {
        self.index
    }

    pub fn set_index(&mut self, index: Option<u32>) {
        self.index = index;
    }

    /// タグを和集合でマージ
    pub fn merge_tags<T, S>(&mut self, tags: T)
    where
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags.extend(normalize_tags(tags));
    }

    /// ファイル名などに使う識別名（インデックスがあればそれ、なければフィンガープリント）
    pub fn display_name(&self) -> String {
        match self.index {
            Some(index) => index.to_string(),
            None => self.fingerprint.clone(),
        }
    }
}

/// タグを小文字化・前後空白除去し、空文字と重複を取り除く
pub fn normalize_tags<T, S>(tags: T) -> BTreeSet<String>
where
    T: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// カンマ区切りのタグ文字列を分割
pub fn parse_tag_list(input: &str) -> BTreeSet<String> {
    normalize_tags(input.split(','))
}

/// シート名の妥当性をチェック
pub fn validate_sheet_name(sheet_name: &str) -> TileResult<()> {
    if sheet_name.trim().is_empty() {
        return Err(TileError::invalid_sheet_name("シート名が空です"));
    }
    Ok(())
}
