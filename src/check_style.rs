//! スタイル検査エンジン
//!
//! プライマリ列を先頭から1回走査して命名規則・assert の副作用・スマート
//! ポインタの配列初期化を検査し、続けて raw 列のコメント書式と波括弧の
//! 改行違反を報告する。診断はトークン列順に出力する。
//!
//! 同じ関数・変数は参照箇所がいくつあっても一度だけ検査する。

use tracing::debug;

use crate::diagnostic::{Diagnostic, DiagnosticSink, RuleId, Severity};
use crate::link::get_link;
use crate::naming::{self, Declaration, NameCheck, PrefixOutcome};
use crate::source::Location;
use crate::symbols::{AccessLevel, Function, FunctionKind, Scope, ScopeId, SymbolDatabase, Variable};
use crate::token::{SymbolRef, Token, TokenIndex, TokenKind};
use crate::token_list::{TokenChain, TokenList};
use crate::type_class::{self, type_string};
use crate::whitelist::{Role, Whitelist};

/// 検査済み関数の識別情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub kind: FunctionKind,
    pub init_arg_count: u32,
    pub scope_name: Option<String>,
}

impl FunctionSignature {
    fn new(function: &Function, scope: Option<&Scope>) -> Self {
        Self {
            name: function.name.clone(),
            kind: function.kind,
            init_arg_count: function.init_arg_count,
            scope_name: scope.map(|s| s.class_name.clone()),
        }
    }

    /// 同じ関数とみなせるか
    ///
    /// スコープ名はどちらにもある場合だけ比較する。
    pub fn matches(&self, other: &FunctionSignature) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.init_arg_count == other.init_arg_count
            && compatible(&self.scope_name, &other.scope_name)
    }
}

/// 検査済み変数の識別情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSignature {
    pub name: String,
    pub index: u32,
    pub type_name: Option<String>,
    pub scope_name: Option<String>,
}

impl VariableSignature {
    fn new(variable: &Variable, scope: Option<&Scope>) -> Self {
        Self {
            name: variable.name.clone(),
            index: variable.index,
            type_name: variable.type_name.clone(),
            scope_name: scope.map(|s| s.class_name.clone()),
        }
    }

    pub fn matches(&self, other: &VariableSignature) -> bool {
        self.name == other.name
            && self.index == other.index
            && compatible(&self.type_name, &other.type_name)
            && compatible(&self.scope_name, &other.scope_name)
    }
}

fn compatible(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// スタイル検査器
pub struct StyleChecker<'a> {
    whitelist: &'a Whitelist,
    db: &'a dyn SymbolDatabase,
    checked_functions: Vec<FunctionSignature>,
    checked_variables: Vec<VariableSignature>,
}

impl<'a> StyleChecker<'a> {
    pub fn new(whitelist: &'a Whitelist, db: &'a dyn SymbolDatabase) -> Self {
        Self {
            whitelist,
            db,
            checked_functions: Vec::new(),
            checked_variables: Vec::new(),
        }
    }

    pub fn checked_functions(&self) -> &[FunctionSignature] {
        &self.checked_functions
    }

    pub fn checked_variables(&self) -> &[VariableSignature] {
        &self.checked_variables
    }

    /// プライマリ列、raw 列の順に検査する
    pub fn check(&mut self, list: &TokenList, sink: &mut dyn DiagnosticSink) {
        let indices: Vec<TokenIndex> = list.tokens().indices().collect();
        for idx in indices {
            self.check_token(list, idx, sink);
        }
        for (_, token) in list.raw_tokens().iter() {
            self.check_raw_token(token, sink);
        }
    }

    /// プライマリ列の1トークンを検査する
    pub fn check_token(&mut self, list: &TokenList, idx: TokenIndex, sink: &mut dyn DiagnosticSink) {
        let Some(token) = list.tokens().get(idx) else {
            debug!(?idx, "token index out of range");
            return;
        };

        match token.kind {
            TokenKind::FunctionRef => self.check_function_ref(token, sink),
            TokenKind::VariableRef => self.check_variable_ref(token, sink),
            _ if token.text == "assert" => check_assert(list.tokens(), idx, sink),
            _ => {}
        }

        if matches!(token.text.as_str(), "shared_ptr" | "scoped_ptr") {
            check_smart_pointer(list.tokens(), idx, sink);
        }
    }

    /// raw 列の1トークンを検査する
    pub fn check_raw_token(&self, token: &Token, sink: &mut dyn DiagnosticSink) {
        match token.kind {
            TokenKind::Comment => check_comment(token, sink),
            TokenKind::IndentViolation => check_indent(token, sink),
            _ => debug!(text = %token.text, "unexpected raw token"),
        }
    }

    fn scope_of(&self, declared: Option<ScopeId>, token: &Token) -> Option<&'a Scope> {
        let db = self.db;
        declared.or(token.scope).and_then(|id| db.scope(id))
    }

    fn check_function_ref(&mut self, token: &Token, sink: &mut dyn DiagnosticSink) {
        let Some(SymbolRef::Function(id)) = token.symbol else {
            debug!(text = %token.text, "function token without function handle");
            return;
        };
        let db = self.db;
        let Some(function) = db.function(id) else {
            debug!(?id, "unresolved function handle");
            return;
        };

        let scope = self.scope_of(function.scope, token);
        let signature = FunctionSignature::new(function, scope);
        if self.checked_functions.iter().any(|c| c.matches(&signature)) {
            return;
        }
        self.checked_functions.push(signature);

        let in_class = scope.is_some_and(Scope::is_class_or_struct);
        let role = match (in_class, function.access) {
            (true, _) if function.is_special_member() => None,
            (true, AccessLevel::Private | AccessLevel::Protected) => Some(Role::Method),
            _ => Some(Role::Function),
        };

        if let Some(role) = role {
            if !naming::check_function_name(self.whitelist, role, &function.name) {
                let method_prefix = self.whitelist.role_prefix(Role::Method);
                let (rule, message) = match role {
                    Role::Method => (
                        RuleId::MethodPrefix,
                        format!(
                            "prefix of method: {}( ) is invalid - correct prefix: {}",
                            function.name, method_prefix
                        ),
                    ),
                    _ => (
                        RuleId::FunctionPrefix,
                        format!(
                            "prefix of function: {}( ) is invalid - prefix: {} is only allowed for methods",
                            function.name, method_prefix
                        ),
                    ),
                };
                sink.report(Diagnostic::style(token.location(), rule, message));
            }
        }

        for &arg in &function.arguments {
            match db.variable(arg) {
                Some(param) => self.check_variable(token.location(), param, Role::Parameter, sink),
                None => debug!(?arg, function = %function.name, "unresolved parameter handle"),
            }
        }
    }

    fn check_variable_ref(&mut self, token: &Token, sink: &mut dyn DiagnosticSink) {
        let Some(SymbolRef::Variable { id, .. }) = token.symbol else {
            debug!(text = %token.text, "variable token without variable handle");
            return;
        };
        let db = self.db;
        let Some(variable) = db.variable(id) else {
            debug!(?id, "unresolved variable handle");
            return;
        };
        // 引数は関数側で検査する
        if variable.is_argument {
            return;
        }

        let scope = self.scope_of(variable.scope, token);
        let signature = VariableSignature::new(variable, scope);
        if self.checked_variables.iter().any(|c| c.matches(&signature)) {
            return;
        }
        self.checked_variables.push(signature);

        let role = if scope.is_some_and(Scope::is_class_or_struct) {
            Role::Attribute
        } else if variable.is_global {
            Role::GlobalVariable
        } else {
            Role::Local
        };
        self.check_variable(token.location(), variable, role, sink);
    }

    /// 変数名の接頭辞を検査する
    fn check_variable(&self, location: Location, variable: &Variable, role: Role, sink: &mut dyn DiagnosticSink) {
        let ts = type_string(&variable.type_tokens);
        let name = variable.name.as_str();
        let label = role.label();
        let decl = Declaration::of(variable, &ts, role);

        let required = match naming::required_prefix(self.whitelist, &decl) {
            PrefixOutcome::Forbidden => {
                sink.report(Diagnostic::style(
                    location,
                    RuleId::ForbiddenType,
                    format!("use of forbidden type: {ts} in {label}: {ts} {name}"),
                ));
                return;
            }
            PrefixOutcome::Required(required) => required,
        };

        if required.unknown_type {
            sink.report(Diagnostic::new(
                location,
                Severity::Information,
                RuleId::UnknownTypePrefix,
                format!("no matching prefix found for type: {ts}"),
            ));
        }
        if required.class_pointer {
            sink.report(Diagnostic::style(
                location,
                RuleId::ClassPointer,
                format!(
                    "forbidden use of pointer for class: {ts} {name} - please use: boost::shared_ptr< {} >",
                    type_class::filter_type(&ts)
                ),
            ));
        }

        let prefix = &required.prefix;
        let diagnostic = match naming::check_name(prefix, name) {
            NameCheck::Valid => None,
            NameCheck::Missing => Some((RuleId::MissingName, format!("no variable name for type: {ts}"))),
            NameCheck::TooShort => Some((
                RuleId::NamingPrefix,
                format!("name of {label}: {ts} {name} is too short - correct prefix: {prefix}"),
            )),
            NameCheck::Mismatch => Some((
                RuleId::NamingPrefix,
                format!("prefix of {label}: {ts} {name} is invalid - correct prefix: {prefix}"),
            )),
        };
        if let Some((rule, message)) = diagnostic {
            sink.report(Diagnostic::style(location, rule, message));
        }
    }
}

/// `assert( ... )` の中の副作用を報告する
fn check_assert(chain: &TokenChain, idx: TokenIndex, sink: &mut dyn DiagnosticSink) {
    let Some(open) = chain.next(idx).filter(|&o| chain[o].text == "(") else {
        return;
    };
    let Some(close) = chain[open].bracket_link.or_else(|| get_link(chain, open)) else {
        debug!(line = chain[open].line, "assert without closing parenthesis");
        return;
    };

    let mut findings = Vec::new();
    let mut cursor = chain.next(open);
    while let Some(i) = cursor {
        if i == close {
            break;
        }
        let token = &chain[i];
        if token.is_inc_dec() {
            findings.push(format!("forbidden operation: {}", token.text));
        } else if token.kind == TokenKind::FunctionRef {
            findings.push(format!("forbidden function call: {}( )", token.text));
        } else if token.text == "(" {
            // 未解決の名前や関数ポインタ変数に続く呼び出し括弧
            let callee = chain.previous(i).map(|p| &chain[p]);
            if let Some(callee) =
                callee.filter(|c| matches!(c.kind, TokenKind::Identifier | TokenKind::VariableRef))
            {
                findings.push(format!("forbidden function call: {}( )", callee.text));
            }
        }
        cursor = chain.next(i);
    }

    let statement = chain.join_range(chain.next(open), close);
    for what in findings {
        sink.report(Diagnostic::style(
            chain[open].location(),
            RuleId::AssertSideEffect,
            format!("assert statement: assert( {statement}) includes {what}"),
        ));
    }
}

/// コメント書式
///
/// 1行コメントは `//! ...` か `//xx ...`（2文字のイニシャル）、
/// 複数行コメントは `/** ...`。
fn check_comment(token: &Token, sink: &mut dyn DiagnosticSink) {
    if let Some(message) = comment_violation(token) {
        sink.report(Diagnostic::style(token.location(), RuleId::CommentFormat, message));
    }
}

fn comment_violation(token: &Token) -> Option<String> {
    let text = token.text.as_str();
    let chars: Vec<char> = text.chars().collect();

    if chars.len() < 3 {
        return Some(format!("single-line comment: \"{text}\" is too short"));
    }

    if !token.is_single_line_comment() {
        return (!text.starts_with("/**"))
            .then(|| format!("multi-line comment: \"{text}\" has invalid format - correct: \"/** ...\""));
    }

    let correct = if text.starts_with("// ") {
        "\"//xx ...\" or \"//! ...\""
    } else if text.starts_with("//!") {
        if chars.len() < 4 || chars[3] == ' ' {
            return None;
        }
        "\"//! ...\""
    } else {
        if chars.len() < 5 || (chars[4] == ' ' && chars[3] != ' ') {
            return None;
        }
        "\"//xx ...\""
    };
    Some(format!("single-line comment: \"{text}\" has invalid format - correct: {correct}"))
}

fn check_indent(token: &Token, sink: &mut dyn DiagnosticSink) {
    let message = match token.text.as_str() {
        "{" => {
            "invalid indent format for opening character: '{' - please make sure there is exactly one newline character before the opening character"
        }
        "}" => {
            "invalid indent format for closing character: '}' - please make sure there is one newline character minimum before the closing character"
        }
        other => {
            debug!(text = other, "unexpected indent token");
            return;
        }
    };
    sink.report(Diagnostic::style(token.location(), RuleId::BraceIndent, message));
}

/// `shared_ptr<T> p(new T[n])` のような配列初期化を報告する
fn check_smart_pointer(chain: &TokenChain, idx: TokenIndex, sink: &mut dyn DiagnosticSink) {
    let pointer = chain[idx].text.as_str();
    let array = match pointer {
        "shared_ptr" => "shared_array",
        _ => "scoped_array",
    };

    // 名前空間修飾 (`boost::`)
    let namespace = chain
        .previous(idx)
        .filter(|&p| chain[p].text == "::")
        .and_then(|p| chain.previous(p))
        .filter(|&n| chain[n].is_name())
        .map(|n| format!("{}::", chain[n].text))
        .unwrap_or_default();

    let Some(open) = chain.next(idx).filter(|&o| chain[o].text == "<") else {
        return;
    };
    let Some(close) = get_link(chain, open) else {
        debug!(line = chain[open].line, "template argument list is not closed");
        return;
    };
    let Some(name) = chain.next(close).filter(|&n| chain[n].is_identifier_like()) else {
        return;
    };
    let template_arg = type_string(&template_arguments(chain, open, close));
    let variable = chain[name].text.as_str();

    let mut cursor = chain.next(name);
    let new_at = loop {
        let Some(i) = cursor else {
            return;
        };
        match chain[i].text.as_str() {
            "new" => break i,
            ";" | ")" | "{" | "," => return,
            _ => cursor = chain.next(i),
        }
    };

    // `new` の型の直後が `[` の時だけ配列初期化
    let Some(bracket) = skip_new_type(chain, new_at).filter(|&b| chain[b].text == "[") else {
        return;
    };
    let new_type = type_string(&template_arguments(chain, new_at, bracket));
    let declared = format!("{namespace}{pointer}< {template_arg} > {variable}");
    let location = chain[idx].location();
    if new_type != template_arg {
        sink.report(Diagnostic::style(
            location,
            RuleId::SmartPointerArray,
            format!(
                "invalid array initialization of class: {declared} with new < {new_type} > make sure the same type is used for the array allocation"
            ),
        ));
    }
    sink.report(Diagnostic::style(
        location,
        RuleId::SmartPointerArray,
        format!("forbidden array initialization of class: {declared} - please use: {namespace}{array}< {template_arg} >"),
    ));
}

/// `new` に続く型名を読み飛ばし、その次の字句を返す
fn skip_new_type(chain: &TokenChain, new_at: TokenIndex) -> Option<TokenIndex> {
    let mut cursor = chain.next(new_at);
    while let Some(i) = cursor {
        let token = &chain[i];
        cursor = if token.text == "<" {
            get_link(chain, i).and_then(|close| chain.next(close))
        } else if token.is_name() || matches!(token.text.as_str(), "::" | "*") {
            chain.next(i)
        } else {
            return Some(i);
        };
    }
    None
}

/// `open` と `close` の間の字句
///
/// `close` が `>>` の場合は内側のテンプレートを閉じる `>` を補う。
fn template_arguments(chain: &TokenChain, open: TokenIndex, close: TokenIndex) -> Vec<&str> {
    let mut texts = texts_between(chain, open, close);
    if chain[close].text == ">>" {
        let depth = texts.iter().fold(0isize, |d, &t| match t {
            "<" => d + 1,
            ">" => d - 1,
            ">>" => d - 2,
            _ => d,
        });
        texts.extend(std::iter::repeat_n(">", depth.max(0) as usize));
    }
    texts
}

/// `from` と `to` の間（両端を含まない）の字句
fn texts_between(chain: &TokenChain, from: TokenIndex, to: TokenIndex) -> Vec<&str> {
    std::iter::successors(chain.next(from), |&i| chain.next(i))
        .take_while(|&i| i != to)
        .map(|i| chain[i].text.as_str())
        .collect()
}
