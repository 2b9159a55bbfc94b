//! 接頭辞の決定
//!
//! 宣言の型・役割・構造から必要な接頭辞を求める純粋関数群。
//! 同じホワイトリストと同じ入力なら常に同じ結果を返す。

use crate::symbols::Variable;
use crate::type_class::{self, TypeClass};
use crate::whitelist::{FORBIDDEN, Role, Whitelist};

/// 接頭辞判定に使う宣言の事実
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub type_string: &'a str,
    pub role: Role,
    pub type_class: TypeClass,
    pub is_class: bool,
    /// 型にポインタ・参照記号を含む
    pub is_indirect: bool,
    pub starts_with_standard_type: bool,
}

impl<'a> Declaration<'a> {
    pub fn of(var: &Variable, type_string: &'a str, role: Role) -> Self {
        Self {
            type_string,
            role,
            type_class: TypeClass::of(var, type_string),
            is_class: var.is_class,
            is_indirect: type_string.contains(['*', '&']),
            starts_with_standard_type: type_class::starts_with_standard_type(var),
        }
    }
}

/// 必要な接頭辞
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPrefix {
    pub prefix: String,
    /// ホワイトリストに無くクラスとも判定できなかった
    pub unknown_type: bool,
    /// クラス型への生ポインタ（スマートポインタを勧める）
    pub class_pointer: bool,
}

/// 接頭辞判定の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixOutcome {
    /// 禁止型。名前は検査しない
    Forbidden,
    Required(RequiredPrefix),
}

/// 必要な接頭辞を求める
pub fn required_prefix(whitelist: &Whitelist, decl: &Declaration<'_>) -> PrefixOutcome {
    let key = type_class::whitelist_key(decl.type_string);

    let mut unknown_type = false;
    let type_prefix = match whitelist.lookup(&key) {
        Some(FORBIDDEN) => return PrefixOutcome::Forbidden,
        Some(prefix) => prefix,
        None if decl.is_class || (decl.is_indirect && !decl.starts_with_standard_type) => {
            whitelist.lookup("class").unwrap_or("")
        }
        None => {
            unknown_type = true;
            ""
        }
    };

    let type_prefix = match decl.type_class.override_key() {
        Some(key) => whitelist.lookup(key).unwrap_or(""),
        None => type_prefix,
    };

    let class_pointer = decl.type_class == TypeClass::Pointer && (decl.is_class || !decl.starts_with_standard_type);

    PrefixOutcome::Required(RequiredPrefix {
        prefix: format!("{}{}", whitelist.role_prefix(decl.role), type_prefix),
        unknown_type,
        class_pointer,
    })
}

/// 名前と接頭辞の照合結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCheck {
    Valid,
    Missing,
    TooShort,
    Mismatch,
}

/// 名前の先頭が接頭辞と一致するか（大文字小文字を区別）
pub fn check_name(prefix: &str, name: &str) -> NameCheck {
    if name.is_empty() {
        NameCheck::Missing
    } else if name.chars().count() < prefix.chars().count() {
        NameCheck::TooShort
    } else if name.starts_with(prefix) {
        NameCheck::Valid
    } else {
        NameCheck::Mismatch
    }
}

/// 関数名の規則: メソッドは `_` で始まり、それ以外は `_` で始まらない
pub fn check_function_name(whitelist: &Whitelist, role: Role, name: &str) -> bool {
    let method_prefix = whitelist.role_prefix(Role::Method);
    if method_prefix.is_empty() {
        return true;
    }
    match role {
        Role::Method => name.starts_with(method_prefix),
        _ => !name.starts_with(method_prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(tokens: &[&str]) -> Variable {
        Variable {
            type_tokens: tokens.iter().map(|s| s.to_string()).collect(),
            ..Variable::default()
        }
    }

    fn prefix_of(var: &Variable, role: Role) -> PrefixOutcome {
        let ts = type_class::type_string(&var.type_tokens);
        required_prefix(&Whitelist::default(), &Declaration::of(var, &ts, role))
    }

    fn required(prefix: &str) -> PrefixOutcome {
        PrefixOutcome::Required(RequiredPrefix {
            prefix: prefix.to_string(),
            unknown_type: false,
            class_pointer: false,
        })
    }

    #[test]
    fn test_parameter_prefix() {
        let v = var(&["unsigned", "int"]);
        assert_eq!(prefix_of(&v, Role::Parameter), required("p_u"));
        assert_eq!(check_name("p_u", "p_uCount"), NameCheck::Valid);
        assert_eq!(check_name("p_u", "u_count"), NameCheck::Mismatch);
        assert_eq!(check_name("p_u", "pu_count"), NameCheck::Mismatch);
    }

    #[test]
    fn test_container_prefix() {
        let v = var(&["std", "::", "vector", "<", "int", ">"]);
        assert_eq!(prefix_of(&v, Role::Local), required("vec"));
        assert_eq!(check_name("vec", "vecValues"), NameCheck::Valid);
        assert_eq!(check_name("vec", "values"), NameCheck::Mismatch);
    }

    #[test]
    fn test_forbidden_type() {
        for role in [Role::Local, Role::Parameter, Role::Attribute, Role::GlobalVariable] {
            assert_eq!(prefix_of(&var(&["long"]), role), PrefixOutcome::Forbidden);
        }
        assert_eq!(prefix_of(&var(&["unsigned", "short"]), Role::Local), PrefixOutcome::Forbidden);
    }

    #[test]
    fn test_forbidden_type_spellings() {
        let spellings: [&[&str]; 6] = [
            &["long", "int"],
            &["unsigned", "long", "int"],
            &["signed", "long"],
            &["long", "double"],
            &["short", "int"],
            &["const", "long", "long", "int"],
        ];
        for tokens in spellings {
            assert_eq!(prefix_of(&var(tokens), Role::Local), PrefixOutcome::Forbidden, "{tokens:?}");
        }
        assert_ne!(prefix_of(&var(&["signed", "int"]), Role::Local), PrefixOutcome::Forbidden);
    }

    #[test]
    fn test_pointer_and_array_override() {
        let mut v = var(&["int", "*"]);
        v.is_pointer = true;
        assert_eq!(prefix_of(&v, Role::Attribute), required("m_p"));

        let mut v = var(&["char"]);
        v.is_array = true;
        assert_eq!(prefix_of(&v, Role::GlobalVariable), required("g_arr"));

        let v = var(&["boost", "::", "shared_array", "<", "char", ">"]);
        assert_eq!(prefix_of(&v, Role::Local), required("arr"));
    }

    #[test]
    fn test_class_pointer_advice() {
        let mut v = var(&["CReader", "*"]);
        v.is_pointer = true;
        v.is_class = true;
        let PrefixOutcome::Required(req) = prefix_of(&v, Role::Local) else {
            panic!("unexpected forbidden");
        };
        assert_eq!(req.prefix, "p");
        assert!(req.class_pointer);
        assert!(!req.unknown_type);
    }

    #[test]
    fn test_unknown_type() {
        let PrefixOutcome::Required(req) = prefix_of(&var(&["float"]), Role::Parameter) else {
            panic!("unexpected forbidden");
        };
        assert_eq!(req.prefix, "p_");
        assert!(req.unknown_type);

        let mut class_var = var(&["CReader"]);
        class_var.is_class = true;
        assert_eq!(prefix_of(&class_var, Role::Local), required("c"));
    }

    #[test]
    fn test_name_checks() {
        assert_eq!(check_name("m_str", ""), NameCheck::Missing);
        assert_eq!(check_name("m_str", "m_s"), NameCheck::TooShort);
        assert_eq!(check_name("", "i"), NameCheck::Valid);
    }

    #[test]
    fn test_function_names() {
        let wl = Whitelist::default();
        assert!(check_function_name(&wl, Role::Method, "_readBlock"));
        assert!(!check_function_name(&wl, Role::Method, "readBlock"));
        assert!(check_function_name(&wl, Role::Function, "readBlock"));
        assert!(!check_function_name(&wl, Role::Function, "_readBlock"));
    }
}
