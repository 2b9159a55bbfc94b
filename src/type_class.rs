//! 宣言型の文字列化と分類
//!
//! シンボルデータベースが持つ宣言型トークン列から、ホワイトリスト照合用の
//! 型文字列と [`TypeClass`] を求める。

use crate::symbols::Variable;
use crate::token;

/// 型文字列に含めない修飾子
const QUALIFIERS: &[&str] = &[
    "const", "volatile", "static", "mutable", "extern", "register", "inline",
];

fn is_word(s: &str) -> bool {
    s.starts_with(|c: char| c.is_alphanumeric() || c == '_')
}

/// 宣言型トークン列を型文字列にする
///
/// 名前同士の間にだけ空白を入れる (`unsigned int`, `std::vector<int>`)。
/// `)` `;` `}` で打ち切る。
pub fn type_string<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::new();
    let mut prev_word = false;
    for tok in tokens {
        let tok = tok.as_ref();
        if matches!(tok, ")" | ";" | "}") {
            break;
        }
        if QUALIFIERS.contains(&tok) {
            continue;
        }
        let word = is_word(tok);
        if word && prev_word {
            out.push(' ');
        }
        out.push_str(tok);
        prev_word = word;
    }
    out
}

/// 先頭の型トークン（修飾子を除く）
pub fn first_type_token<S: AsRef<str>>(tokens: &[S]) -> Option<&str> {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .find(|t| !QUALIFIERS.contains(t))
}

/// `*` と `&` を取り除く
pub fn filter_type(type_string: &str) -> String {
    type_string
        .chars()
        .filter(|&c| c != '*' && c != '&')
        .collect::<String>()
        .trim()
        .to_string()
}

/// ホワイトリストの照合キー
///
/// 反復子は種類によらず `iterator` / `const_iterator`、テンプレートは
/// `<` より前のコンテナ名。
pub fn whitelist_key(type_string: &str) -> String {
    let filtered = filter_type(type_string);
    if filtered.ends_with("const_iterator") {
        return "const_iterator".to_string();
    }
    if filtered.ends_with("iterator") {
        return "iterator".to_string();
    }
    match filtered.find('<') {
        Some(pos) => filtered[..pos].trim().to_string(),
        None => canonical_builtin(&filtered).unwrap_or(filtered),
    }
}

/// 組み込み型の綴りの揺れを正規化する
///
/// `signed` を落とし、`long` / `short` に付く `int` を落とす
/// (`long int` → `long`、`signed short int` → `short`、`signed` → `int`)。
/// 組み込み型の語だけでできていなければ `None`。
fn canonical_builtin(type_string: &str) -> Option<String> {
    const WORDS: &[&str] = &["signed", "unsigned", "short", "long", "int", "char", "double"];

    let words: Vec<&str> = type_string.split_whitespace().collect();
    if words.is_empty() || !words.iter().all(|w| WORDS.contains(w)) {
        return None;
    }
    let sized = words.iter().any(|w| matches!(*w, "long" | "short"));
    let kept: Vec<&str> = words
        .into_iter()
        .filter(|&w| w != "signed" && !(sized && w == "int"))
        .collect();
    if kept.is_empty() {
        return Some("int".to_string());
    }
    Some(kept.join(" "))
}

/// テンプレート名（名前空間 `boost::` / `std::` を除く）
pub fn template_name(type_string: &str) -> Option<&str> {
    let pos = type_string.find('<')?;
    let head = type_string[..pos].trim();
    Some(
        head.strip_prefix("boost::")
            .or_else(|| head.strip_prefix("std::"))
            .unwrap_or(head),
    )
}

/// 宣言の構造的な分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Plain,
    Pointer,
    Array,
    BoostSharedPtr,
    BoostScopedPtr,
    BoostSharedArray,
    BoostScopedArray,
}

impl TypeClass {
    /// ポインタ・配列・スマートポインタを判定する
    ///
    /// 生ポインタ、スマートポインタ、配列の順に優先する。
    pub fn of(var: &Variable, type_string: &str) -> Self {
        if var.is_pointer {
            return TypeClass::Pointer;
        }
        let template = template_name(type_string);
        match template {
            Some("shared_ptr") => return TypeClass::BoostSharedPtr,
            Some("scoped_ptr") => return TypeClass::BoostScopedPtr,
            _ => {}
        }
        if var.is_array {
            return TypeClass::Array;
        }
        match template {
            Some("shared_array") => TypeClass::BoostSharedArray,
            Some("scoped_array") => TypeClass::BoostScopedArray,
            _ => TypeClass::Plain,
        }
    }

    /// 型接頭辞を置き換える役割キー
    pub fn override_key(self) -> Option<&'static str> {
        match self {
            TypeClass::Plain => None,
            TypeClass::Pointer | TypeClass::BoostSharedPtr | TypeClass::BoostScopedPtr => Some("pointer"),
            TypeClass::Array | TypeClass::BoostSharedArray | TypeClass::BoostScopedArray => Some("array"),
        }
    }
}

/// 宣言型の先頭が組み込み型か
pub fn starts_with_standard_type(var: &Variable) -> bool {
    first_type_token(&var.type_tokens).is_some_and(token::is_standard_type)
}
