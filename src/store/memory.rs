use super::{Document, DocumentStore, Filter, Patch, RemoveOptions, UpdateOptions};
use crate::core::error::TileResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 挿入順を保ったドキュメントの集合
///
/// メモリ版とファイル版のストアで検索・更新・削除のロジックを共有する。
#[derive(Debug, Clone, Default)]
pub(crate) struct DocumentSet {
    documents: Vec<Document>,
}

impl DocumentSet {
    pub(crate) fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub(crate) fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub(crate) fn find(&self, filter: &Filter) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect()
    }

    pub(crate) fn find_one(&self, filter: &Filter) -> Option<Document> {
        self.documents.iter().find(|doc| filter.matches(doc)).cloned()
    }

    pub(crate) fn insert(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// 更新は全件に適用してから確定する（途中で失敗したら何も変更しない）
    pub(crate) fn update(
        &mut self,
        filter: &Filter,
        patch: &Patch,
        options: UpdateOptions,
    ) -> TileResult<usize> {
        let mut updated = self.documents.clone();
        let mut count = 0;

        for doc in updated.iter_mut().filter(|doc| filter.matches(doc)) {
            patch.apply(doc)?;
            count += 1;
            if !options.multi {
                break;
            }
        }

        self.documents = updated;
        Ok(count)
    }

    pub(crate) fn remove(&mut self, filter: &Filter, options: RemoveOptions) -> usize {
        if options.multi {
            let before = self.documents.len();
            self.documents.retain(|doc| !filter.matches(doc));
            return before - self.documents.len();
        }

        match self.documents.iter().position(|doc| filter.matches(doc)) {
            Some(position) => {
                self.documents.remove(position);
                1
            }
            None => 0,
        }
    }
}

/// メモリ内保存のドキュメントストア（テスト用および一時利用）
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Mutex<DocumentSet>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用：保存済みドキュメント数を取得
    pub async fn len(&self) -> usize {
        self.inner.lock().await.documents().len()
    }

    /// テスト用：空かどうか
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, filter: &Filter) -> TileResult<Vec<Document>> {
        Ok(self.inner.lock().await.find(filter))
    }

    async fn find_one(&self, filter: &Filter) -> TileResult<Option<Document>> {
        Ok(self.inner.lock().await.find_one(filter))
    }

    async fn insert(&self, document: Document) -> TileResult<()> {
        self.inner.lock().await.insert(document);
        Ok(())
    }

    async fn update(
        &self,
        filter: &Filter,
        patch: &Patch,
        options: UpdateOptions,
    ) -> TileResult<usize> {
        self.inner.lock().await.update(filter, patch, options)
    }

    async fn remove(&self, filter: &Filter, options: RemoveOptions) -> TileResult<usize> {
        Ok(self.inner.lock().await.remove(filter, options))
    }
}
