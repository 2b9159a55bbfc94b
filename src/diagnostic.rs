//! 診断メッセージ

use std::fmt;

use serde::Serialize;

use crate::source::{DisplayLocation, FileTable, Location};

/// 重大度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 修正すべき規約違反
    Style,
    /// 分類できず規則を適用しなかった
    Information,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Style => "style",
            Severity::Information => "information",
        })
    }
}

/// 規則 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleId {
    NamingPrefix,
    MissingName,
    UnknownTypePrefix,
    ForbiddenType,
    ClassPointer,
    MethodPrefix,
    FunctionPrefix,
    AssertSideEffect,
    CommentFormat,
    BraceIndent,
    SmartPointerArray,
}

impl RuleId {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::NamingPrefix => "namingPrefix",
            RuleId::MissingName => "missingName",
            RuleId::UnknownTypePrefix => "unknownTypePrefix",
            RuleId::ForbiddenType => "forbiddenType",
            RuleId::ClassPointer => "classPointer",
            RuleId::MethodPrefix => "methodPrefix",
            RuleId::FunctionPrefix => "functionPrefix",
            RuleId::AssertSideEffect => "assertSideEffect",
            RuleId::CommentFormat => "commentFormat",
            RuleId::BraceIndent => "braceIndent",
            RuleId::SmartPointerArray => "smartPointerArray",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1件の診断
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    pub rule: RuleId,
    pub message: String,
}

impl Diagnostic {
    pub fn new(location: Location, severity: Severity, rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            location,
            severity,
            rule,
            message: message.into(),
        }
    }

    pub fn style(location: Location, rule: RuleId, message: impl Into<String>) -> Self {
        Self::new(location, Severity::Style, rule, message)
    }

    /// `file:line: severity (rule) message` 形式で表示する
    pub fn display<'a>(&'a self, files: &'a FileTable) -> DisplayDiagnostic<'a> {
        DisplayDiagnostic { diag: self, files }
    }

    /// ファイル名を解決した出力用レコード
    pub fn to_record(&self, files: &FileTable) -> DiagnosticRecord {
        DiagnosticRecord {
            file: files.get(self.location.file_index).unwrap_or("?").to_string(),
            line: self.location.line,
            severity: self.severity,
            rule: self.rule,
            message: self.message.clone(),
        }
    }
}

/// ファイル名解決付きの表示
pub struct DisplayDiagnostic<'a> {
    diag: &'a Diagnostic,
    files: &'a FileTable,
}

impl fmt::Display for DisplayDiagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = DisplayLocation {
            loc: self.diag.location,
            files: self.files,
        };
        write!(f, "{}: {} ({}) {}", loc, self.diag.severity, self.diag.rule, self.diag.message)
    }
}

/// JSON 出力用
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub rule: RuleId,
    pub message: String,
}

/// 診断の受け取り口
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileIndex;

    #[test]
    fn test_display_and_record() {
        let mut files = FileTable::new();
        files.push("main.cpp");
        let diag = Diagnostic::style(
            Location::new(FileIndex::ROOT, 12),
            RuleId::BraceIndent,
            "invalid indent",
        );

        assert_eq!(diag.display(&files).to_string(), "main.cpp:12: style (braceIndent) invalid indent");

        let json = serde_json::to_string(&diag.to_record(&files)).unwrap();
        assert_eq!(
            json,
            r#"{"file":"main.cpp","line":12,"severity":"style","rule":"braceIndent","message":"invalid indent"}"#
        );
    }
}
