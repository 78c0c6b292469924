// タイル抽出・重複排除エンジンのエラー型定義

use thiserror::Error;

/// タイルシート処理固有のエラー型
#[derive(Error, Debug)]
pub enum TileError {
    #[error("タイルサイズ不正: {width}x{height} (幅・高さは1以上が必要)")]
    InvalidGeometry { width: u32, height: u32 },

    #[error("シート名不正: {reason}")]
    InvalidSheetName { reason: String },

    #[error("画像デコードエラー: {source_name} - {source}")]
    Decode {
        source_name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("画像エンコードエラー: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },

    #[error("画像サイズ不一致: {left:?} と {right:?} は比較できません")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    #[error("対象が見つかりません: {target}")]
    NotFound { target: String },

    #[error("ストアエラー: {message}")]
    Store { message: String },

    #[error("I/Oエラー: {path} - {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("タスクエラー: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl TileError {
    /// タイルサイズ不正エラーの作成
    pub fn invalid_geometry(width: u32, height: u32) -> Self {
        Self::InvalidGeometry { width, height }
    }

    /// シート名不正エラーの作成
    pub fn invalid_sheet_name(reason: impl Into<String>) -> Self {
        Self::InvalidSheetName {
            reason: reason.into(),
        }
    }

    /// デコードエラーの作成
    pub fn decode(source_name: impl Into<String>, source: image::ImageError) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            source,
        }
    }

    /// エンコードエラーの作成
    pub fn encode(source: image::ImageError) -> Self {
        Self::Encode { source }
    }

    /// サイズ不一致エラーの作成
    pub fn dimension_mismatch(left: (u32, u32), right: (u32, u32)) -> Self {
        Self::DimensionMismatch { left, right }
    }

    /// 未検出エラーの作成
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::NotFound {
            target: target.into(),
        }
    }

    /// ストアエラーの作成
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// I/Oエラーの作成
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidGeometry { .. } | Self::InvalidSheetName { .. } => ErrorSeverity::High,
            Self::Decode { .. } | Self::NotFound { .. } => ErrorSeverity::Medium,
            Self::DimensionMismatch { .. } => ErrorSeverity::High,
            Self::Encode { .. } | Self::Io { .. } | Self::Task { .. } => ErrorSeverity::High,
            // 番号振り直しの途中で失敗するとインデックスの連続性が壊れる
            Self::Store { .. } => ErrorSeverity::Critical,
        }
    }

    /// バッチ処理を継続できるかどうかを判定
    ///
    /// 単一ファイルのデコード失敗や削除対象の未検出はそのファイルだけを
    /// スキップして続行できる。
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Decode { .. } | Self::NotFound { .. } => true,
            Self::Io { .. } => true,
            Self::InvalidGeometry { .. } | Self::InvalidSheetName { .. } => false,
            Self::DimensionMismatch { .. } => false,
            Self::Encode { .. } | Self::Store { .. } | Self::Task { .. } => false,
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - データ整合性に影響
    Critical,
}

impl ErrorSeverity {
    /// 重要度の文字列表現を取得
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl From<tokio::task::JoinError> for TileError {
    fn from(error: tokio::task::JoinError) -> Self {
        TileError::Task { source: error }
    }
}

impl From<serde_json::Error> for TileError {
    fn from(error: serde_json::Error) -> Self {
        TileError::store(format!("レコード形式が不正です: {error}"))
    }
}

/// タイル処理の結果型
pub type TileResult<T> = std::result::Result<T, TileError>;
