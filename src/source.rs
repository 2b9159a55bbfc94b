//! ファイルテーブルとソース位置
//!
//! `#file` 指示で仮想的にインクルードされたファイルを、正規化パスで
//! 重複排除しながら登録する。インデックス 0 は翻訳単位そのもの。

use std::fmt;
use std::path::Path;

use serde::Serialize;

/// ファイルインデックス
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileIndex(u32);

impl FileIndex {
    /// 翻訳単位自身のファイル
    pub const ROOT: FileIndex = FileIndex(0);

    /// 内部IDを取得
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// `Vec` 添字として取得
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for FileIndex {
    fn from(value: u32) -> Self {
        FileIndex(value)
    }
}

/// ソース位置（ファイルと行）
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize)]
pub struct Location {
    pub file_index: FileIndex,
    pub line: u32,
}

impl Location {
    /// 新しいソース位置を作成
    pub fn new(file_index: FileIndex, line: u32) -> Self {
        Self { file_index, line }
    }
}

/// ファイル名解決付きの表示用ロケーション
pub struct DisplayLocation<'a> {
    pub loc: Location,
    pub files: &'a FileTable,
}

impl fmt::Display for DisplayLocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.files.get(self.loc.file_index).unwrap_or("?");
        write!(f, "{}:{}", path, self.loc.line)
    }
}

/// ファイルテーブル
#[derive(Debug, Default, Clone)]
pub struct FileTable {
    paths: Vec<String>,
}

impl FileTable {
    /// 新しいテーブルを作成
    pub fn new() -> Self {
        Self { paths: Vec::new() }
    }

    /// 重複チェックなしで末尾に追加する（翻訳単位の登録用）
    pub fn push(&mut self, path: &str) -> FileIndex {
        let id = FileIndex(self.paths.len() as u32);
        self.paths.push(path.to_string());
        id
    }

    /// 同じファイルを指すエントリを検索
    ///
    /// 複数一致した場合は最後のものを返す。
    pub fn find(&self, path: &str) -> Option<FileIndex> {
        self.paths
            .iter()
            .rposition(|p| same_file_name(p, path))
            .map(|i| FileIndex(i as u32))
    }

    /// 既存エントリを探し、無ければ正規化したパスで登録する
    pub fn register(&mut self, path: &str) -> FileIndex {
        if let Some(id) = self.find(path) {
            return id;
        }
        let simplified = simplify_path(path);
        self.push(&simplified)
    }

    /// インデックスからパスを取得
    pub fn get(&self, id: FileIndex) -> Option<&str> {
        self.paths.get(id.as_usize()).map(String::as_str)
    }

    /// 登録されているファイル数
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// テーブルが空かどうか
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// 全エントリを削除
    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// 登録されたファイルをイテレート
    pub fn iter(&self) -> impl Iterator<Item = (FileIndex, &str)> {
        self.paths
            .iter()
            .enumerate()
            .map(|(i, p)| (FileIndex(i as u32), p.as_str()))
    }

    /// インデックス 1 以降のパスを基準パスからの相対パスに置き換える
    pub fn make_relative<P: AsRef<Path>>(&mut self, base_paths: &[P]) {
        for path in self.paths.iter_mut().skip(1) {
            *path = relative_path(path, base_paths);
        }
    }
}

/// パスを正規化する
///
/// 区切り文字を `/` に統一し、`.` と `dir/..` を畳み込む。
pub fn simplify_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// 2つのパスが同じファイルを指すか
///
/// Windows では大文字小文字を区別しない。
pub fn same_file_name(a: &str, b: &str) -> bool {
    let a = simplify_path(a);
    let b = simplify_path(b);
    if cfg!(windows) {
        a.eq_ignore_ascii_case(&b)
    } else {
        a == b
    }
}

/// 基準パスのいずれかで始まっていれば、その部分を取り除いた相対パスを返す
pub fn relative_path<P: AsRef<Path>>(path: &str, base_paths: &[P]) -> String {
    let simplified = simplify_path(path);
    for base in base_paths {
        let base = simplify_path(&base.as_ref().to_string_lossy());
        if base.is_empty() {
            continue;
        }
        let base = base.trim_end_matches('/');
        if let Some(rest) = simplified.strip_prefix(base) {
            if let Some(rel) = rest.strip_prefix('/') {
                return rel.to_string();
            }
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_table_register() {
        let mut files = FileTable::new();
        let root = files.push("main.cpp");
        let id1 = files.register("inc/a.h");
        let id2 = files.register("inc/b.h");

        assert_eq!(root, FileIndex::ROOT);
        assert_ne!(id1, id2);
        assert_eq!(files.get(id1), Some("inc/a.h"));
        assert_eq!(files.get(id2), Some("inc/b.h"));
    }

    #[test]
    fn test_file_table_same_path() {
        let mut files = FileTable::new();
        let id1 = files.register("inc/./a.h");
        let id2 = files.register("inc/sub/../a.h");

        assert_eq!(id1, id2);
        assert_eq!(files.len(), 1);
        assert_eq!(files.get(id1), Some("inc/a.h"));
    }

    #[test]
    fn test_simplify_path() {
        assert_eq!(simplify_path("a/b/../c"), "a/c");
        assert_eq!(simplify_path("./a//b"), "a/b");
        assert_eq!(simplify_path("../a"), "../a");
        assert_eq!(simplify_path("/x/../../y"), "/y");
        assert_eq!(simplify_path("a\\b.h"), "a/b.h");
    }

    #[test]
    fn test_relative_path() {
        let bases = ["/home/dev/project/"];
        assert_eq!(relative_path("/home/dev/project/src/a.h", &bases), "src/a.h");
        assert_eq!(relative_path("/usr/include/stdio.h", &bases), "/usr/include/stdio.h");
    }

    #[test]
    fn test_make_relative_keeps_root() {
        let mut files = FileTable::new();
        files.push("/home/dev/project/main.cpp");
        files.register("/home/dev/project/inc/a.h");
        files.make_relative(&["/home/dev/project"]);

        assert_eq!(files.get(FileIndex::ROOT), Some("/home/dev/project/main.cpp"));
        assert_eq!(files.get(FileIndex::from(1)), Some("inc/a.h"));
    }
}
