use bitflags::bitflags;

use crate::source::{FileIndex, Location};
use crate::symbols::{FunctionId, ScopeId, VariableId};

/// トークンアリーナ内の位置
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TokenIndex(u32);

impl TokenIndex {
    /// 添字から作成
    pub fn new(index: usize) -> Self {
        TokenIndex(index as u32)
    }

    /// `Vec` 添字として取得
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// トークン種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// 演算子・区切り記号（括弧、`;`、`,` を含む）
    Operator,
    /// C/C++ キーワード
    Keyword,
    /// 数値リテラル
    Number,
    /// 文字列リテラル
    StringLit,
    /// 文字リテラル
    CharLit,
    /// 未解決の識別子
    Identifier,
    /// 関数を参照する識別子
    FunctionRef,
    /// 変数を参照する識別子
    VariableRef,
    /// コメント（rawリストのみ）
    Comment,
    /// 波括弧の改行規則違反（rawリストのみ）
    IndentViolation,
    /// その他
    Other,
}

bitflags! {
    /// トークン属性
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TokenFlags: u8 {
        const UNSIGNED = 1 << 0;
        const SIGNED = 1 << 1;
        const LONG = 1 << 2;
        const UNUSED = 1 << 3;
        const POINTER_COMPARE = 1 << 4;
        /// マクロ展開由来
        const EXPANDED_FROM_MACRO = 1 << 5;
    }
}

/// シンボルデータベースへの非所有参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolRef {
    Function(FunctionId),
    Variable { id: VariableId, var_id: u32 },
}

/// 多文字演算子（長いものから照合する）
pub const PUNCTUATORS: &[&str] = &[
    "...", "<<=", ">>=", "::", "++", "--", "<<", ">>", "==", "!=", "<=", ">=", "&&", "||",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "->", "+", "-", "*", "/", "%", "&", "|",
    "^", "?", "!", "=", "<", ">", "[", "]", "(", ")", "{", "}", ";", ":", ",", ".", "~", "##",
];

/// C/C++ キーワード
const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "asm", "auto", "bool", "break", "case", "catch", "char",
    "class", "const", "const_cast", "constexpr", "continue", "decltype", "default",
    "delete", "do", "double", "dynamic_cast", "else", "enum", "explicit", "export",
    "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "mutable", "namespace", "new", "noexcept", "nullptr", "operator", "private",
    "protected", "public", "register", "reinterpret_cast", "return", "short", "signed",
    "sizeof", "static", "static_assert", "static_cast", "struct", "switch", "template",
    "this", "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned",
    "using", "virtual", "void", "volatile", "wchar_t", "while",
];

/// 組み込み型
const STANDARD_TYPES: &[&str] = &[
    "bool", "char", "short", "int", "long", "float", "double", "wchar_t", "size_t", "void",
    "signed", "unsigned",
];

/// キーワードかどうか
pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

/// 組み込み型名かどうか
pub fn is_standard_type(s: &str) -> bool {
    STANDARD_TYPES.contains(&s)
}

/// 字句からトークン種別を決める
pub fn classify(text: &str) -> TokenKind {
    let Some(first) = text.chars().next() else {
        return TokenKind::Other;
    };
    if first.is_ascii_digit() {
        TokenKind::Number
    } else if first == '"' {
        TokenKind::StringLit
    } else if first == '\'' {
        TokenKind::CharLit
    } else if first.is_alphabetic() || first == '_' || first == '$' {
        if is_keyword(text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    } else if PUNCTUATORS.contains(&text) {
        TokenKind::Operator
    } else {
        TokenKind::Other
    }
}

/// トークン
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub line: u32,
    pub file_index: FileIndex,
    pub kind: TokenKind,
    pub flags: TokenFlags,
    pub symbol: Option<SymbolRef>,
    pub scope: Option<ScopeId>,
    /// 対応する括弧（括弧トークンのみ、対称）
    pub bracket_link: Option<TokenIndex>,
    pub ast_operand1: Option<TokenIndex>,
    pub ast_operand2: Option<TokenIndex>,
    pub ast_parent: Option<TokenIndex>,
    pub(crate) next: Option<TokenIndex>,
    pub(crate) previous: Option<TokenIndex>,
}

impl Token {
    /// 新しいトークンを作成（種別は字句から決める）
    pub fn new(text: impl Into<String>, line: u32, file_index: FileIndex) -> Self {
        let text = text.into();
        let kind = classify(&text);
        Self::with_kind(text, kind, line, file_index)
    }

    /// 種別を指定してトークンを作成
    pub fn with_kind(text: impl Into<String>, kind: TokenKind, line: u32, file_index: FileIndex) -> Self {
        Self {
            text: text.into(),
            line,
            file_index,
            kind,
            flags: TokenFlags::empty(),
            symbol: None,
            scope: None,
            bracket_link: None,
            ast_operand1: None,
            ast_operand2: None,
            ast_parent: None,
            next: None,
            previous: None,
        }
    }

    /// 意味情報（種別・属性・スコープ・シンボル）を引き継いだコピーを作る
    ///
    /// リンクと AST は引き継がない。
    pub fn copy_semantics(&self, line: u32, file_index: FileIndex) -> Self {
        let mut copy = Self::with_kind(self.text.clone(), self.kind, line, file_index);
        copy.flags = self.flags;
        copy.scope = self.scope;
        copy.symbol = self.symbol;
        copy
    }

    pub fn location(&self) -> Location {
        Location::new(self.file_index, self.line)
    }

    pub fn next(&self) -> Option<TokenIndex> {
        self.next
    }

    pub fn previous(&self) -> Option<TokenIndex> {
        self.previous
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    /// 名前トークンか（識別子・キーワード・解決済み参照）
    pub fn is_name(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::Keyword | TokenKind::FunctionRef | TokenKind::VariableRef
        )
    }

    /// キーワード以外の名前か
    pub fn is_identifier_like(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::FunctionRef | TokenKind::VariableRef
        )
    }

    pub fn is_op(&self) -> bool {
        self.kind == TokenKind::Operator
    }

    pub fn is_opening_bracket(&self) -> bool {
        self.kind == TokenKind::Operator && matches!(self.text.as_str(), "(" | "[" | "{")
    }

    pub fn is_closing_bracket(&self) -> bool {
        self.kind == TokenKind::Operator && matches!(self.text.as_str(), ")" | "]" | "}")
    }

    pub fn is_inc_dec(&self) -> bool {
        self.kind == TokenKind::Operator && matches!(self.text.as_str(), "++" | "--")
    }

    pub fn is_standard_type(&self) -> bool {
        is_standard_type(&self.text)
    }

    pub fn is_expanded_macro(&self) -> bool {
        self.flags.contains(TokenFlags::EXPANDED_FROM_MACRO)
    }

    pub fn set_expanded_macro(&mut self, expanded: bool) {
        self.flags.set(TokenFlags::EXPANDED_FROM_MACRO, expanded);
    }

    /// 1行コメントか（`//` で始まる）
    pub fn is_single_line_comment(&self) -> bool {
        self.kind == TokenKind::Comment && self.text.starts_with("//")
    }
}
