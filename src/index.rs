// シート内インデックスの管理
//
// 1つのシートに属するレコードのインデックスは0始まりで連続する。
// 追加は末尾に、削除は大きいインデックスから順に行い、削除位置より
// 後ろのレコードを1つずつ詰める。

use crate::core::error::{TileError, TileResult};
use crate::core::types::RemovalOutcome;
use crate::image_ops::ImageBackend;
use crate::store::{DocumentStore, Filter, Patch, RemoveOptions, UpdateOptions};
use crate::tile::{fields, Tile, TileRecord};
use serde_json::Value;
use std::collections::BTreeSet;

/// ストア上のインデックスを割り当て・詰め直すアロケータ
pub struct IndexAllocator<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> IndexAllocator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn sheet_filter(sheet_name: &str) -> Filter {
        Filter::all().eq(fields::SHEET_NAME, sheet_name)
    }

    /// 次に割り当てるインデックス（シート内の件数）
    pub async fn next_index(&self, sheet_name: &str) -> TileResult<u32> {
        let count = self.store.count(&Self::sheet_filter(sheet_name)).await?;
        u32::try_from(count)
            .map_err(|_| TileError::store(format!("シート '{sheet_name}' の件数が上限を超えています")))
    }

    /// タイルに次のインデックスを割り当てて保存する
    pub async fn append<I: ImageBackend + ?Sized>(
        &self,
        backend: &I,
        tile: &mut Tile,
    ) -> TileResult<u32> {
        let index = self.next_index(tile.sheet_name()).await?;
        tile.set_index(Some(index));

        let record = TileRecord::from_tile(backend, tile)?;
        self.store.insert(record.to_document()?).await?;

        log::debug!("inserted '{}' #{} ({})", tile.sheet_name(), index, tile.fingerprint());
        Ok(index)
    }

    /// インデックスを指定して削除し、後続を詰める
    ///
    /// 大きいインデックスから処理するため、途中で失敗しても残りの
    /// インデックスはそのまま再実行できる。
    pub async fn remove(&self, sheet_name: &str, indices: &[u32]) -> TileResult<RemovalOutcome> {
        let unique: BTreeSet<u32> = indices.iter().copied().collect();
        let mut outcome = RemovalOutcome::default();

        for &index in unique.iter().rev() {
            let target = Self::sheet_filter(sheet_name).eq(fields::INDEX, index);
            let removed = self.store.remove(&target, RemoveOptions::single()).await?;
            if removed == 0 {
                log::warn!("sheet '{sheet_name}' has no tile at index {index}");
                outcome.missing.push(index);
                continue;
            }

            let followers = Self::sheet_filter(sheet_name).gt(fields::INDEX, index);
            let shifted = self
                .store
                .update(&followers, &Patch::new().inc(fields::INDEX, -1), UpdateOptions::multi())
                .await?;
            log::debug!("removed '{sheet_name}' #{index}, shifted {shifted} records");
            outcome.removed.push(index);
        }

        if !unique.is_empty() && outcome.removed.is_empty() {
            let requested: Vec<String> = unique.iter().map(u32::to_string).collect();
            return Err(TileError::not_found(format!(
                "シート '{}' のインデックス {}",
                sheet_name,
                requested.join(", ")
            )));
        }

        outcome.removed.reverse();
        outcome.missing.reverse();
        Ok(outcome)
    }

    /// 同じフィンガープリントのレコードがあればタグを和集合でマージする
    ///
    /// インデックスは変更しない。マージしたら`true`を返す。
    pub async fn merge_tags(
        &self,
        sheet_name: &str,
        fingerprint: &str,
        tags: &BTreeSet<String>,
    ) -> TileResult<bool> {
        let filter = Self::sheet_filter(sheet_name).eq(fields::HASH, fingerprint);
        let Some(document) = self.store.find_one(&filter).await? else {
            return Ok(false);
        };

        let record = TileRecord::from_document(document)?;
        let mut merged: BTreeSet<String> = record.tags.into_iter().collect();
        merged.extend(tags.iter().cloned());

        let value = Value::Array(merged.into_iter().map(Value::String).collect());
        self.store
            .update(&filter, &Patch::new().set(fields::TAGS, value), UpdateOptions::single())
            .await?;
        Ok(true)
    }

    /// フィンガープリントから現在のインデックスを引く（昇順）
    pub async fn resolve_fingerprints(
        &self,
        sheet_name: &str,
        fingerprints: &[String],
    ) -> TileResult<Vec<u32>> {
        let filter =
            Self::sheet_filter(sheet_name).is_in(fields::HASH, fingerprints.iter().map(String::as_str));
        let mut indices = Vec::new();
        for document in self.store.find(&filter).await? {
            let record = TileRecord::from_document(document)?;
            if let Some(index) = record.index {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }
}
