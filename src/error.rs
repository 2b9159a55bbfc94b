use std::path::PathBuf;

/// トークン化エラー
///
/// どちらも翻訳単位の解析を打ち切る。
#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    /// 対応する `#file` のない `#endfile`
    #[error("unbalanced #endfile at line {line}")]
    UnbalancedEndfile { line: u32 },

    /// 外部から停止が要求された
    #[error("tokenization terminated on request")]
    Terminated,
}

/// 設定・シンボルファイルの読み込みエラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// ファイルを読み込み、失敗時はパス付きのエラーにする
    pub(crate) fn read(path: &std::path::Path) -> Result<String, ConfigError> {
        std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn json(path: &std::path::Path, source: serde_json::Error) -> ConfigError {
        ConfigError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// 解析パイプラインのエラー
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("tokenize error: {0}")]
    Tokenize(#[from] TokenizeError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// クレート共通の `Result`
pub type Result<T, E = AnalyzeError> = std::result::Result<T, E>;
