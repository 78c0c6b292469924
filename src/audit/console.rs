// 端末での対話的なタイル確認

use super::preview::render_preview;
use super::{AuditDecision, TileAuditor};
use crate::core::error::{TileError, TileResult};
use crate::tile::{parse_tag_list, Tile};
use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// プレビューの既定の最大幅（文字数）
pub const DEFAULT_PREVIEW_COLUMNS: u32 = 64;

/// 入力ストリームから1行ずつ回答を読む確認実装
pub struct ConsoleAuditor<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
    preview_columns: Option<u32>,
}

impl ConsoleAuditor<BufReader<Stdin>, std::io::Stdout> {
    /// 標準入出力を使う
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), std::io::stdout())
    }
}

impl<R, W> ConsoleAuditor<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
            preview_columns: Some(DEFAULT_PREVIEW_COLUMNS),
        }
    }

    /// プレビュー幅を設定（`None`でプレビューなし）
    pub fn with_preview_columns(mut self, columns: Option<u32>) -> Self {
        self.preview_columns = columns;
        self
    }

    /// 出力先を取り出す
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }

    async fn write(&self, text: &str) -> TileResult<()> {
        let mut output = self.output.lock().await;
        output
            .write_all(text.as_bytes())
            .and_then(|_| output.flush())
            .map_err(|e| TileError::io("stdout", e))
    }

    async fn read_answer(&self) -> TileResult<String> {
        let mut line = String::new();
        let read = self
            .input
            .lock()
            .await
            .read_line(&mut line)
            .await
            .map_err(|e| TileError::io("stdin", e))?;
        if read == 0 {
            return Err(TileError::io(
                "stdin",
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "入力が終了しました"),
            ));
        }
        Ok(line.trim().to_lowercase())
    }
}

#[async_trait]
impl<R, W> TileAuditor for ConsoleAuditor<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn confirm(&self, tile: &Tile) -> TileResult<AuditDecision> {
        if let Some(columns) = self.preview_columns {
            self.write(&render_preview(tile.pixels(), columns)).await?;
        }

        let question = format!(
            "{} - {}x{} tile (preview). Look ok? [a]dd / [s]kip / [t]ag (a): ",
            tile.fingerprint(),
            tile.width(),
            tile.height()
        );

        loop {
            self.write(&question).await?;
            match self.read_answer().await?.as_str() {
                "" | "a" | "add" | "y" => return Ok(AuditDecision::Accept),
                "s" | "skip" | "n" => return Ok(AuditDecision::Skip),
                "t" | "tag" => return Ok(AuditDecision::Tag),
                other => {
                    self.write(&format!("⚠️  不明な回答です: {other}\n")).await?;
                }
            }
        }
    }

    async fn collect_tags(&self, defaults: &[String]) -> TileResult<Vec<String>> {
        self.write(&format!(
            "Add case-insensitive, comma-separated tags ({}): ",
            defaults.join(",")
        ))
        .await?;

        let answer = self.read_answer().await?;
        if answer.is_empty() {
            return Ok(defaults.to_vec());
        }
        Ok(parse_tag_list(&answer).into_iter().collect())
    }
}

/// 全てのタイルを受け入れる確認実装（非対話実行・テスト用）
#[derive(Debug, Default, Clone)]
pub struct AutoAcceptAuditor;

impl AutoAcceptAuditor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TileAuditor for AutoAcceptAuditor {
    async fn confirm(&self, _tile: &Tile) -> TileResult<AuditDecision> {
        Ok(AuditDecision::Accept)
    }

    async fn collect_tags(&self, defaults: &[String]) -> TileResult<Vec<String>> {
        Ok(defaults.to_vec())
    }
}
