use super::memory::DocumentSet;
use super::{Document, DocumentStore, Filter, Patch, RemoveOptions, UpdateOptions};
use crate::core::error::{TileError, TileResult};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// 1行1ドキュメントのJSONファイルで永続化するドキュメントストア
///
/// 挿入は行の追記で即座に永続化する。更新・削除はファイル全体を
/// 一時ファイルに書き出してから置き換える。
#[derive(Debug)]
pub struct JsonLinesDocumentStore {
    path: PathBuf,
    inner: Mutex<DocumentSet>,
}

impl JsonLinesDocumentStore {
    /// ファイルを読み込んでストアを開く（存在しなければ空で開始）
    pub async fn open(path: impl AsRef<Path>) -> TileResult<Self> {
        let path = path.as_ref().to_path_buf();
        let documents = match tokio::fs::read_to_string(&path).await {
            Ok(content) => Self::parse(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(TileError::io(path.display().to_string(), e)),
        };

        log::debug!(
            "opened document store {} ({} documents)",
            path.display(),
            documents.len()
        );

        Ok(Self {
            path,
            inner: Mutex::new(DocumentSet::from_documents(documents)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(content: &str) -> TileResult<Vec<Document>> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| match serde_json::from_str::<Value>(line)? {
                Value::Object(document) => Ok(document),
                _ => Err(TileError::store(format!(
                    "{}行目がオブジェクトではありません",
                    number + 1
                ))),
            })
            .collect()
    }

    async fn ensure_parent_dir(&self) -> TileResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| TileError::io(parent.display().to_string(), e))?;
            }
        }
        Ok(())
    }

    async fn append_line(&self, document: &Document) -> TileResult<()> {
        self.ensure_parent_dir().await?;
        let mut line = serde_json::to_string(document)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;
        Ok(())
    }

    async fn rewrite(&self, documents: &[Document]) -> TileResult<()> {
        self.ensure_parent_dir().await?;
        let mut content = String::new();
        for document in documents {
            content.push_str(&serde_json::to_string(document)?);
            content.push('\n');
        }

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|e| TileError::io(temp_path.display().to_string(), e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn io_error(&self, error: std::io::Error) -> TileError {
        TileError::io(self.path.display().to_string(), error)
    }
}

#[async_trait]
impl DocumentStore for JsonLinesDocumentStore {
    async fn find(&self, filter: &Filter) -> TileResult<Vec<Document>> {
        Ok(self.inner.lock().await.find(filter))
    }

    async fn find_one(&self, filter: &Filter) -> TileResult<Option<Document>> {
        Ok(self.inner.lock().await.find_one(filter))
    }

    async fn insert(&self, document: Document) -> TileResult<()> {
        let mut set = self.inner.lock().await;
        self.append_line(&document).await?;
        set.insert(document);
        Ok(())
    }

    async fn update(
        &self,
        filter: &Filter,
        patch: &Patch,
        options: UpdateOptions,
    ) -> TileResult<usize> {
        let mut set = self.inner.lock().await;
        let mut next = set.clone();
        let count = next.update(filter, patch, options)?;
        if count > 0 {
            self.rewrite(next.documents()).await?;
            *set = next;
        }
        Ok(count)
    }

    async fn remove(&self, filter: &Filter, options: RemoveOptions) -> TileResult<usize> {
        let mut set = self.inner.lock().await;
        let mut next = set.clone();
        let count = next.remove(filter, options);
        if count > 0 {
            self.rewrite(next.documents()).await?;
            *set = next;
        }
        Ok(count)
    }
}
