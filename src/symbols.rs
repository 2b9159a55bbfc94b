//! シンボルデータベース
//!
//! トークンを関数・変数・スコープに解決する外部インターフェースと、
//! JSON ダンプから構築できるメモリ上の実装 `SymbolTable`。
//! トークンはここで定義する ID を非所有参照として保持する。

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::source::FileIndex;
use crate::token::{SymbolRef, TokenIndex, TokenKind};
use crate::token_list::TokenList;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub fn new(id: u32) -> Self {
                $name(id)
            }

            pub fn as_usize(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// 関数レコードの ID
    FunctionId
);
define_id!(
    /// 変数レコードの ID
    VariableId
);
define_id!(
    /// スコープレコードの ID
    ScopeId
);

/// アクセスレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    #[default]
    Public,
    Protected,
    Private,
    Global,
    Namespace,
}

/// 関数の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    #[default]
    Function,
    Constructor,
    CopyConstructor,
    Destructor,
    Operator,
}

/// スコープの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    #[default]
    Global,
    Namespace,
    Class,
    Struct,
    Union,
    Function,
    Other,
}

/// 宣言・参照位置（解決時の絞り込み用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolSite {
    pub file: u32,
    pub line: u32,
}

/// 関数レコード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Function {
    pub name: String,
    pub access: AccessLevel,
    pub kind: FunctionKind,
    pub scope: Option<ScopeId>,
    pub arguments: Vec<VariableId>,
    pub min_arg_count: u32,
    pub init_arg_count: u32,
    /// 空なら名前だけで解決する
    pub sites: Vec<SymbolSite>,
}

impl Function {
    /// コンストラクタ・デストラクタ・演算子関数か
    pub fn is_special_member(&self) -> bool {
        !matches!(self.kind, FunctionKind::Function)
    }
}

/// 変数レコード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variable {
    pub name: String,
    pub var_id: u32,
    /// 宣言順の位置
    pub index: u32,
    /// 宣言型のトークン列（例: `["boost", "::", "shared_ptr", "<", "char", ">"]`）
    pub type_tokens: Vec<String>,
    pub is_pointer: bool,
    pub is_array: bool,
    pub is_class: bool,
    pub is_global: bool,
    pub is_argument: bool,
    pub scope: Option<ScopeId>,
    /// クラス型の場合の型名
    pub type_name: Option<String>,
    pub sites: Vec<SymbolSite>,
}

/// スコープレコード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    pub class_name: String,
    pub kind: ScopeKind,
}

impl Scope {
    pub fn is_class_or_struct(&self) -> bool {
        matches!(self.kind, ScopeKind::Class | ScopeKind::Struct)
    }
}

/// シンボル解決インターフェース
///
/// `resolve_*` はトークン位置から ID を返し、ID からレコードを引く。
/// どれも解決できなければ `None` で、呼び出し側はその検査だけを省く。
pub trait SymbolDatabase {
    fn resolve_function(&self, list: &TokenList, idx: TokenIndex) -> Option<FunctionId>;
    fn resolve_variable(&self, list: &TokenList, idx: TokenIndex) -> Option<VariableId>;
    fn enclosing_scope(&self, list: &TokenList, idx: TokenIndex) -> Option<ScopeId>;
    fn function(&self, id: FunctionId) -> Option<&Function>;
    fn variable(&self, id: VariableId) -> Option<&Variable>;
    fn scope(&self, id: ScopeId) -> Option<&Scope>;
}

/// メモリ上のシンボルテーブル
///
/// レコードの ID は各配列の添字。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolTable {
    pub functions: Vec<Function>,
    pub variables: Vec<Variable>,
    pub scopes: Vec<Scope>,
}

fn site_matches(sites: &[SymbolSite], file: FileIndex, line: u32) -> bool {
    sites.is_empty()
        || sites
            .iter()
            .any(|s| s.file == file.as_u32() && s.line == line)
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// JSON ファイルから読み込む
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = ConfigError::read(path)?;
        Self::from_json(&text).map_err(|e| ConfigError::json(path, e))
    }

    pub fn add_scope(&mut self, scope: Scope) -> ScopeId {
        self.scopes.push(scope);
        ScopeId::new(self.scopes.len() as u32 - 1)
    }

    pub fn add_function(&mut self, function: Function) -> FunctionId {
        self.functions.push(function);
        FunctionId::new(self.functions.len() as u32 - 1)
    }

    pub fn add_variable(&mut self, variable: Variable) -> VariableId {
        self.variables.push(variable);
        VariableId::new(self.variables.len() as u32 - 1)
    }
}

impl SymbolDatabase for SymbolTable {
    fn resolve_function(&self, list: &TokenList, idx: TokenIndex) -> Option<FunctionId> {
        let chain = list.tokens();
        let token = chain.get(idx)?;
        if !token.is_identifier_like() || !chain.is(token.next(), "(") {
            return None;
        }
        self.functions
            .iter()
            .position(|f| f.name == token.text && site_matches(&f.sites, token.file_index, token.line))
            .map(|i| FunctionId::new(i as u32))
    }

    fn resolve_variable(&self, list: &TokenList, idx: TokenIndex) -> Option<VariableId> {
        let token = list.tokens().get(idx)?;
        if !token.is_identifier_like() {
            return None;
        }
        self.variables
            .iter()
            .position(|v| v.name == token.text && site_matches(&v.sites, token.file_index, token.line))
            .map(|i| VariableId::new(i as u32))
    }

    fn enclosing_scope(&self, list: &TokenList, idx: TokenIndex) -> Option<ScopeId> {
        let token = list.tokens().get(idx)?;
        match token.symbol? {
            SymbolRef::Function(id) => self.function(id)?.scope,
            SymbolRef::Variable { id, .. } => self.variable(id)?.scope,
        }
    }

    fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.as_usize())
    }

    fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.as_usize())
    }

    fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.as_usize())
    }
}

/// 識別子トークンに関数・変数参照とスコープを書き込む
///
/// 解決できたトークン数を返す。
pub fn annotate(list: &mut TokenList, db: &dyn SymbolDatabase) -> usize {
    let candidates: Vec<TokenIndex> = list
        .tokens()
        .iter()
        .filter(|(_, t)| t.kind == TokenKind::Identifier)
        .map(|(i, _)| i)
        .collect();

    let mut resolved = 0;
    for idx in candidates {
        let (kind, symbol) = if let Some(id) = db.resolve_function(list, idx) {
            (TokenKind::FunctionRef, SymbolRef::Function(id))
        } else if let Some(id) = db.resolve_variable(list, idx) {
            let Some(var) = db.variable(id) else {
                debug!(?id, "variable handle without record");
                continue;
            };
            (
                TokenKind::VariableRef,
                SymbolRef::Variable {
                    id,
                    var_id: var.var_id,
                },
            )
        } else {
            continue;
        };

        let chain = list.tokens_mut();
        chain[idx].kind = kind;
        chain[idx].symbol = Some(symbol);
        let scope = db.enclosing_scope(list, idx);
        list.tokens_mut()[idx].scope = scope;
        resolved += 1;
    }
    resolved
}
