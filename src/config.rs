//! 解析設定
//!
//! `Settings` はトークナイザが参照する実行時設定、`CheckerConfig` は
//! JSON から読み込むチェッカー設定。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// トークナイザの実行時設定
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// ファイルテーブルを相対化する基準パス
    pub base_paths: Vec<PathBuf>,
    /// 停止要求フラグ（複数の解析で共有できる）
    pub terminated: Arc<AtomicBool>,
}

impl Settings {
    pub fn with_base_paths(base_paths: Vec<PathBuf>) -> Self {
        Self {
            base_paths,
            terminated: Arc::default(),
        }
    }

    /// 停止を要求する
    pub fn request_termination(&self) {
        self.terminated.store(true, Ordering::Relaxed);
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Relaxed)
    }
}

/// チェッカー設定（JSON）
///
/// ```json
/// {
///   "whitelist": { "TMoney": "mny", "float": "f" },
///   "replace_whitelist": false,
///   "base_paths": ["/home/dev/terminal"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// 追加・上書きするホワイトリスト項目
    pub whitelist: BTreeMap<String, String>,
    /// true なら既定のホワイトリストを使わない
    pub replace_whitelist: bool,
    pub base_paths: Vec<PathBuf>,
}

impl CheckerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// JSON ファイルから読み込む
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = ConfigError::read(path)?;
        Self::from_json(&text).map_err(|e| ConfigError::json(path, e))
    }
}
