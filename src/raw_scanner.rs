//! 未加工ソースの再走査
//!
//! プリプロセス前のソース（仮想インクルード行 `#file <path>` / `#endfile`
//! を含む）を走査し、コメントと波括弧の改行規則違反を raw 列に積む。

use tracing::{debug, warn};

use crate::source::FileIndex;
use crate::token::TokenKind;
use crate::token_list::TokenList;

impl TokenList {
    /// raw 列を構築し、追加したトークン数を返す
    ///
    /// `#file` のパスはプライマリ列の字句解析で登録済みでなければならない。
    /// 見つからない領域は対応する `#endfile` まで何も出力しない。
    pub fn create_tokens_raw(&mut self, raw: &str) -> usize {
        let emitted = RawScanner::new(self, raw).run();
        debug!(emitted, "raw scan finished");
        emitted
    }
}

/// 仮想ファイル1段分の状態
#[derive(Clone, Copy)]
struct Frame {
    /// `None` はファイルテーブルで解決できなかった領域
    file: Option<FileIndex>,
    line: u32,
}

struct RawScanner<'a> {
    list: &'a mut TokenList,
    chars: Vec<char>,
    pos: usize,
    stack: Vec<Frame>,
    emitted: usize,
}

impl<'a> RawScanner<'a> {
    fn new(list: &'a mut TokenList, raw: &str) -> Self {
        Self {
            list,
            chars: raw.chars().collect(),
            pos: 0,
            stack: vec![Frame {
                file: Some(FileIndex::ROOT),
                line: 1,
            }],
            emitted: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_n(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn frame(&mut self) -> &mut Frame {
        // ルートフレームは決して取り除かない
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.chars.get(self.pos - 1) == Some(&'\n')
    }

    fn run(mut self) -> usize {
        while let Some(c) = self.peek() {
            if c == '#' && self.at_line_start() && self.marker_line() {
                continue;
            }
            match c {
                '"' | '\'' => self.skip_literal(c),
                '/' if self.peek_n(1) == Some('/') => self.line_comment(),
                '/' if self.peek_n(1) == Some('*') => self.block_comment(),
                '{' => {
                    if self.newlines_before() != 1 {
                        self.emit("{", TokenKind::IndentViolation);
                    }
                    self.pos += 1;
                }
                '}' => {
                    if self.newlines_before() == 0 {
                        self.emit("}", TokenKind::IndentViolation);
                    }
                    self.pos += 1;
                }
                '\n' => {
                    self.frame().line += 1;
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        self.emitted
    }

    /// 行末まで（改行を含まない）の文字列
    fn rest_of_line(&self) -> String {
        self.chars[self.pos..].iter().take_while(|&&c| c != '\n').collect()
    }

    /// `#file` / `#endfile` 行なら処理して true を返す
    ///
    /// 指示行そのものは行数に数えない。
    fn marker_line(&mut self) -> bool {
        let line = self.rest_of_line();
        let mut words = line.splitn(2, char::is_whitespace);
        let directive = words.next().unwrap_or("");
        let argument = words.next().unwrap_or("").trim();

        match directive {
            "#file" if !argument.is_empty() => {
                let path = argument.trim_matches('"');
                let file = self.list.files.find(path);
                if file.is_none() {
                    warn!(path, "raw scan: #file not in file table, region skipped");
                }
                self.stack.push(Frame { file, line: 1 });
            }
            "#endfile" => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
            }
            _ => return false,
        }

        self.pos += line.chars().count();
        if self.peek() == Some('\n') {
            self.pos += 1;
        }
        true
    }

    /// 文字列・文字リテラルを読み飛ばす
    ///
    /// エスケープされていない改行でも終わる。
    fn skip_literal(&mut self, delim: char) {
        self.pos += 1;
        let mut special = false;
        while let Some(c) = self.peek() {
            if c == '\n' && !special {
                return;
            }
            self.pos += 1;
            if c == '\n' {
                self.frame().line += 1;
            }
            if !special && c == delim {
                return;
            }
            special = !special && c == '\\';
        }
    }

    fn line_comment(&mut self) {
        let text = self.rest_of_line();
        self.pos += text.chars().count();
        self.emit(&text, TokenKind::Comment);
        if self.peek() == Some('\n') {
            self.pos += 1;
            self.frame().line += 1;
        }
    }

    fn block_comment(&mut self) {
        let start = self.pos;
        let mut end = self.chars.len();
        let mut i = start + 2;
        while i + 1 < self.chars.len() {
            if self.chars[i] == '*' && self.chars[i + 1] == '/' {
                end = i + 2;
                break;
            }
            i += 1;
        }

        let text: String = self.chars[start..end].iter().collect();
        let newlines = text.matches('\n').count() as u32;
        self.emit(&text, TokenKind::Comment);
        self.frame().line += newlines;
        self.pos = end;
    }

    /// 直前の空白列に含まれる改行数
    fn newlines_before(&self) -> usize {
        self.chars[..self.pos]
            .iter()
            .rev()
            .take_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
            .filter(|&&c| c == '\n')
            .count()
    }

    fn emit(&mut self, text: &str, kind: TokenKind) {
        let Frame { file, line } = *self.frame();
        if let Some(file) = file {
            self.list.add_raw_token(text, line, file, kind);
            self.emitted += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn scan(files: &[&str], raw: &str) -> Vec<(String, TokenKind, u32, u32)> {
        let mut list = TokenList::new(Settings::default());
        for f in files {
            list.files.push(f);
        }
        list.create_tokens_raw(raw);
        list.raw_tokens()
            .iter()
            .map(|(_, t)| (t.text.clone(), t.kind, t.file_index.as_u32(), t.line))
            .collect()
    }

    #[test]
    fn test_comments_and_line_numbers() {
        let raw = "//ds first\nint a; /* one\ntwo */\n//! third\n";
        let tokens = scan(&["main.cpp"], raw);
        assert_eq!(
            tokens,
            [
                ("//ds first".to_string(), TokenKind::Comment, 0, 1),
                ("/* one\ntwo */".to_string(), TokenKind::Comment, 0, 2),
                ("//! third".to_string(), TokenKind::Comment, 0, 4),
            ]
        );
    }

    #[test]
    fn test_brace_rules() {
        let raw = "void f() {\n}\nvoid g()\n{\n    int i; }\nvoid h()\n\n{\n}\n";
        let tokens: Vec<_> = scan(&["main.cpp"], raw)
            .into_iter()
            .map(|(text, _, _, line)| (text, line))
            .collect();
        assert_eq!(
            tokens,
            [
                ("{".to_string(), 1),
                ("}".to_string(), 5),
                ("{".to_string(), 8),
            ]
        );
    }

    #[test]
    fn test_virtual_file_regions() {
        let raw = "//ds root\n#file inc/a.h\n//ds in a\n\n//ds later\n#endfile\n//ds back\n";
        let tokens = scan(&["main.cpp", "inc/a.h"], raw);
        assert_eq!(
            tokens,
            [
                ("//ds root".to_string(), TokenKind::Comment, 0, 1),
                ("//ds in a".to_string(), TokenKind::Comment, 1, 1),
                ("//ds later".to_string(), TokenKind::Comment, 1, 3),
                ("//ds back".to_string(), TokenKind::Comment, 0, 2),
            ]
        );
    }

    #[test]
    fn test_unresolved_region_emits_nothing() {
        let raw = "#file \"missing.h\"\n// hidden\n{\n#endfile\n//ds shown\n";
        let tokens = scan(&["main.cpp"], raw);
        assert_eq!(tokens, [("//ds shown".to_string(), TokenKind::Comment, 0, 1)]);
    }

    #[test]
    fn test_literals_are_skipped() {
        let raw = "const char* s = \"http://x/*y*/{\";\nchar c = '{';\n";
        assert!(scan(&["main.cpp"], raw).is_empty());
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_end() {
        let tokens = scan(&["main.cpp"], "x;\n/* open\nstill");
        assert_eq!(tokens, [("/* open\nstill".to_string(), TokenKind::Comment, 0, 2)]);
    }

    #[test]
    fn test_stray_endfile_is_ignored() {
        let tokens = scan(&["main.cpp"], "#endfile\n//ds ok\n");
        assert_eq!(tokens, [("//ds ok".to_string(), TokenKind::Comment, 0, 1)]);
    }
}
