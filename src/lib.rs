//! pepper-style
//!
//! C/C++ のトークン列を連結リストとして構築し、括弧の対応と式の AST を
//! 付けたうえで、ハンガリアン記法の命名規約とレイアウト規約を検査する。

pub mod ast;
pub mod check_style;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod lexer;
pub mod link;
pub mod naming;
pub mod number;
pub mod pipeline;
pub mod raw_scanner;
pub mod source;
pub mod symbols;
pub mod token;
pub mod token_list;
pub mod type_class;
pub mod whitelist;

// 主要な型を再エクスポート
pub use ast::{ast_roots, ast_sexp};
pub use check_style::{FunctionSignature, StyleChecker, VariableSignature};
pub use config::{CheckerConfig, Settings};
pub use diagnostic::{Diagnostic, DiagnosticRecord, DiagnosticSink, RuleId, Severity};
pub use error::{AnalyzeError, ConfigError, Result, TokenizeError};
pub use link::{get_link, get_link_inverse, link_brackets};
pub use naming::{Declaration, NameCheck, PrefixOutcome, RequiredPrefix};
pub use pipeline::{Analyzer, AnalyzerBuilder, UnitReport};
pub use source::{DisplayLocation, FileIndex, FileTable, Location};
pub use symbols::{
    AccessLevel, Function, FunctionId, FunctionKind, Scope, ScopeId, ScopeKind, SymbolDatabase,
    SymbolSite, SymbolTable, Variable, VariableId, annotate,
};
pub use token::{SymbolRef, Token, TokenFlags, TokenIndex, TokenKind};
pub use token_list::{TokenChain, TokenList};
pub use type_class::TypeClass;
pub use whitelist::{Role, Whitelist};
