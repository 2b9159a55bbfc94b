//! 命名規約のホワイトリスト
//!
//! 型名・役割名から必要な接頭辞（または禁止を表す [`FORBIDDEN`]）への対応表。
//! 構築後は変更しないので、複数の解析で共有できる。

use std::collections::BTreeMap;

use crate::config::CheckerConfig;

/// 禁止型を表す値
pub const FORBIDDEN: &str = "forbidden";

const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    // 禁止型
    ("long", FORBIDDEN),
    ("unsigned long", FORBIDDEN),
    ("long long", FORBIDDEN),
    ("unsigned long long", FORBIDDEN),
    ("long double", FORBIDDEN),
    ("short", FORBIDDEN),
    ("unsigned short", FORBIDDEN),
    // スカラー型
    ("bool", "b"),
    ("TByteStream", "bs"),
    ("class", "c"),
    ("struct", "c"),
    ("char", "ch"),
    ("unsigned char", "ch"),
    ("double", "d"),
    ("enum", "e"),
    ("HANDLE", "h"),
    ("int", "i"),
    ("size_type", "n"),
    ("TPath", "pth"),
    ("unsigned int", "u"),
    ("string", "str"),
    ("std::string", "str"),
    ("TString", "str"),
    ("type", "t"),
    ("TTime", "tm"),
    ("word", "w"),
    ("pointer", "p"),
    // コンテナ
    ("vector", "vec"),
    ("map", "map"),
    ("multimap", "mmap"),
    ("list", "lst"),
    ("pair", "pr"),
    ("set", "set"),
    ("tuple", "tpl"),
    ("iterator", "it"),
    ("const_iterator", "it"),
    ("std::vector", "vec"),
    ("std::map", "map"),
    ("std::multimap", "mmap"),
    ("std::list", "lst"),
    ("std::pair", "pr"),
    ("std::set", "set"),
    ("std::tuple", "tpl"),
    ("shared_ptr", "p"),
    ("scoped_ptr", "p"),
    ("shared_array", "arr"),
    ("scoped_array", "arr"),
    // 役割
    ("array", "arr"),
    ("method", "_"),
    ("attribute", "m_"),
    ("parameter", "p_"),
    ("global variable", "g_"),
];

/// 名前の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Parameter,
    Attribute,
    GlobalVariable,
    /// ローカル変数（役割接頭辞なし）
    Local,
    /// private / protected メンバ関数
    Method,
    /// それ以外の関数
    Function,
}

impl Role {
    /// 診断メッセージでの呼び名
    pub fn label(self) -> &'static str {
        match self {
            Role::Parameter => "parameter",
            Role::Attribute => "attribute",
            Role::GlobalVariable => "global variable",
            Role::Local => "variable",
            Role::Method => "method",
            Role::Function => "function",
        }
    }

    /// ホワイトリスト上のキー
    pub fn key(self) -> Option<&'static str> {
        match self {
            Role::Parameter => Some("parameter"),
            Role::Attribute => Some("attribute"),
            Role::GlobalVariable => Some("global variable"),
            Role::Method => Some("method"),
            Role::Local | Role::Function => None,
        }
    }
}

/// 接頭辞ホワイトリスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whitelist {
    mapping: BTreeMap<String, String>,
}

impl Default for Whitelist {
    fn default() -> Self {
        Self::with_entries(DEFAULT_ENTRIES.iter().copied())
    }
}

impl Whitelist {
    /// 空のホワイトリスト
    pub fn empty() -> Self {
        Self {
            mapping: BTreeMap::new(),
        }
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            mapping: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// 項目を追加・上書きした新しいホワイトリストを返す
    pub fn with_overrides<K, V>(mut self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.mapping
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// 設定から構築する
    pub fn from_config(config: &CheckerConfig) -> Self {
        let base = if config.replace_whitelist {
            Self::empty()
        } else {
            Self::default()
        };
        base.with_overrides(config.whitelist.clone())
    }

    /// キーをそのまま引き、無ければ `std::` / `boost::` を外して引く
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        if let Some(v) = self.mapping.get(key) {
            return Some(v.as_str());
        }
        let stripped = key
            .strip_prefix("std::")
            .or_else(|| key.strip_prefix("boost::"))?;
        self.mapping.get(stripped).map(String::as_str)
    }

    /// 役割の接頭辞（未登録なら空）
    pub fn role_prefix(&self, role: Role) -> &str {
        role.key().and_then(|k| self.lookup(k)).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mapping.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let wl = Whitelist::default();
        assert_eq!(wl.lookup("unsigned int"), Some("u"));
        assert_eq!(wl.lookup("long"), Some(FORBIDDEN));
        assert_eq!(wl.lookup("std::vector"), Some("vec"));
        assert_eq!(wl.lookup("boost::shared_ptr"), Some("p"));
        assert_eq!(wl.lookup("std::deque"), None);
        assert_eq!(wl.role_prefix(Role::Parameter), "p_");
        assert_eq!(wl.role_prefix(Role::Local), "");
    }

    #[test]
    fn test_from_config() {
        let mut config = CheckerConfig::default();
        config.whitelist.insert("float".into(), "f".into());
        config.whitelist.insert("int".into(), "n".into());

        let wl = Whitelist::from_config(&config);
        assert_eq!(wl.lookup("float"), Some("f"));
        assert_eq!(wl.lookup("int"), Some("n"));
        assert_eq!(wl.lookup("bool"), Some("b"));

        config.replace_whitelist = true;
        let wl = Whitelist::from_config(&config);
        assert_eq!(wl.len(), 2);
        assert_eq!(wl.lookup("bool"), None);
    }

    #[test]
    fn test_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Whitelist>();
    }
}
