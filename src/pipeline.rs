//! 解析パイプライン
//!
//! 1つの翻訳単位に対して次の順でパスを実行する:
//! 1. トークン化（プライマリ列と raw 列）
//! 2. 括弧の対応付け
//! 3. シンボル注釈
//! 4. AST 構築
//! 5. スタイル検査
//!
//! # 使用例
//!
//! ```ignore
//! use pepper_style::{Analyzer, SymbolTable};
//!
//! let analyzer = Analyzer::builder()
//!     .with_config_file("pepper.json")?
//!     .with_base_path("/home/dev/terminal")
//!     .build();
//!
//! let symbols = SymbolTable::from_path("main.symbols.json".as_ref())?;
//! let report = analyzer.analyze(&expanded, "main.cpp", Some(&raw), &symbols)?;
//! for line in report.lines() {
//!     println!("{line}");
//! }
//! ```

use std::path::{Path, PathBuf};

use tracing::info;

use crate::check_style::StyleChecker;
use crate::config::{CheckerConfig, Settings};
use crate::diagnostic::{Diagnostic, DiagnosticRecord, Severity};
use crate::error::{ConfigError, Result};
use crate::link::link_brackets;
use crate::source::FileTable;
use crate::symbols::{SymbolDatabase, annotate};
use crate::token_list::TokenList;
use crate::whitelist::Whitelist;

/// Analyzer を構築するための Builder
#[derive(Debug, Default)]
pub struct AnalyzerBuilder {
    whitelist: Option<Whitelist>,
    config: CheckerConfig,
    settings: Settings,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// ホワイトリストを直接指定する（設定の上書き項目より優先）
    pub fn with_whitelist(mut self, whitelist: Whitelist) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    /// チェッカー設定を適用する
    pub fn with_config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    /// JSON のチェッカー設定を読み込んで適用する
    pub fn with_config_file(self, path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let config = CheckerConfig::from_path(path.as_ref())?;
        Ok(self.with_config(config))
    }

    /// ファイルテーブルを相対化する基準パスを追加
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.base_paths.push(path.into());
        self
    }

    pub fn with_base_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.settings
            .base_paths
            .extend(paths.into_iter().map(Into::into));
        self
    }

    /// 停止フラグを共有する設定を使う
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Analyzer を構築
    pub fn build(self) -> Analyzer {
        let whitelist = self
            .whitelist
            .unwrap_or_else(|| Whitelist::from_config(&self.config));
        let mut settings = self.settings;
        settings.base_paths.extend(self.config.base_paths);
        Analyzer { settings, whitelist }
    }
}

/// 翻訳単位ごとの解析器
///
/// 構築後は不変なので、複数の翻訳単位で使い回せる。
#[derive(Debug, Clone)]
pub struct Analyzer {
    settings: Settings,
    whitelist: Whitelist,
}

impl Default for Analyzer {
    fn default() -> Self {
        AnalyzerBuilder::new().build()
    }
}

impl Analyzer {
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// 1つの翻訳単位を解析する
    ///
    /// `source` はプリプロセス済みの文字列、`raw` は未処理の原文
    /// （コメントと波括弧の検査用）。
    pub fn analyze(
        &self,
        source: &str,
        file0: &str,
        raw: Option<&str>,
        db: &dyn SymbolDatabase,
    ) -> Result<UnitReport> {
        let mut list = TokenList::new(self.settings.clone());
        list.create_tokens(source, file0, raw)?;

        let unmatched_brackets = link_brackets(list.tokens_mut()).len();
        let resolved_symbols = annotate(&mut list, db);
        list.create_ast();

        let mut diagnostics = Vec::new();
        let mut checker = StyleChecker::new(&self.whitelist, db);
        checker.check(&list, &mut diagnostics);

        let report = UnitReport {
            diagnostics,
            files: list.files().clone(),
            token_count: list.tokens().len(),
            unmatched_brackets,
            resolved_symbols,
        };
        info!(
            file = file0,
            tokens = report.token_count,
            symbols = report.resolved_symbols,
            diagnostics = report.diagnostics.len(),
            "unit analyzed"
        );
        Ok(report)
    }
}

/// 1つの翻訳単位の解析結果
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub diagnostics: Vec<Diagnostic>,
    pub files: FileTable,
    pub token_count: usize,
    pub unmatched_brackets: usize,
    pub resolved_symbols: usize,
}

impl UnitReport {
    /// `file:line: severity (rule) message` 形式の行
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.diagnostics
            .iter()
            .map(|d| d.display(&self.files).to_string())
    }

    /// ファイル名を解決した JSON 出力用レコード
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.diagnostics
            .iter()
            .map(|d| d.to_record(&self.files))
            .collect()
    }

    /// style 重大度の診断数
    pub fn style_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Style)
            .count()
    }
}
