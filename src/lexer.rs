//! 字句解析
//!
//! 外部プリプロセッサが展開した文字列をプライマリトークン列に変換する。
//! 入力には仮想インクルード指示 `#file "path"` / `#endfile` / `#line n` と
//! マクロ展開由来を示すマーカー文字 [`MACRO_CHAR`] が埋め込まれている。

use tracing::{debug, trace};

use crate::error::TokenizeError;
use crate::number;
use crate::source::FileIndex;
use crate::token_list::TokenList;

/// マクロ展開由来を示すマーカー文字
pub const MACRO_CHAR: char = '\u{1}';

/// トークン区切り文字（空白と改行を含む）
const SEPARATORS: &str = "+-*/%&|^?!=<>[](){};:,.~\n ";

/// 2文字目が同じ文字なら連結する演算子 (`++`, `::`, `&&` など)
const DOUBLED: &str = "+-<>=:&|";

/// 後ろに `=` が付くと複合演算子になる文字
const COMPOUND: &str = "<>!+-*/%&|^";

impl TokenList {
    /// 文字列をトークン化してプライマリ列を構築する
    ///
    /// `raw` が与えられた場合は続けて raw 列も構築する。どちらの後でも
    /// インデックス 1 以降のファイルパスを基準パスからの相対パスにする。
    pub fn create_tokens(&mut self, code: &str, file0: &str, raw: Option<&str>) -> Result<(), TokenizeError> {
        self.files.push(file0);

        Tokenizer::new(self, code).run()?;

        if let Some(raw) = raw.filter(|r| !r.is_empty()) {
            self.create_tokens_raw(raw);
        }

        let base_paths = self.settings.base_paths.clone();
        self.files.make_relative(&base_paths);
        debug!(
            file = file0,
            tokens = self.tokens().len(),
            files = self.files.len(),
            "tokenized"
        );
        Ok(())
    }
}

/// トークナイザの走査状態
struct Tokenizer<'a> {
    list: &'a mut TokenList,
    chars: Vec<char>,
    pos: usize,
    current: String,
    line: u32,
    file: FileIndex,
    line_stack: Vec<u32>,
    file_stack: Vec<FileIndex>,
    expanded: bool,
}

impl<'a> Tokenizer<'a> {
    fn new(list: &'a mut TokenList, code: &str) -> Self {
        Self {
            list,
            chars: code.chars().collect(),
            pos: 0,
            current: String::new(),
            line: 1,
            file: FileIndex::ROOT,
            line_stack: Vec::new(),
            file_stack: Vec::new(),
            expanded: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_n(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn current_starts_with_digit(&self) -> bool {
        self.current.starts_with(|c: char| c.is_ascii_digit())
    }

    fn run(mut self) -> Result<(), TokenizeError> {
        while let Some(mut ch) = self.bump() {
            if ch == MACRO_CHAR {
                while self.peek() == Some(MACRO_CHAR) {
                    self.pos += 1;
                }
                ch = ' ';
                self.expanded = true;
            } else if ch == '\t' || ch == '\r' {
                ch = ' ';
            }

            if ch == '\'' || ch == '"' {
                self.read_literal(ch);
                continue;
            }

            if ch == '.' && self.current_starts_with_digit() {
                // 小数点 "5.4"
            } else if (ch == '+' || ch == '-')
                && self.current_starts_with_digit()
                && self.current.ends_with(['e', 'E'])
                && !number::is_hex(&self.current)
            {
                // 指数 "4.2e+10"
            } else if self.current.is_empty() && ch == '.' && self.peek().is_some_and(|c| c.is_ascii_digit()) {
                // ".125" -> "0.125"
                self.current.push('0');
            } else if SEPARATORS.contains(ch) {
                self.separator(ch)?;
                continue;
            }

            self.current.push(ch);
        }

        self.flush(true);
        Ok(())
    }

    /// 文字・文字列リテラルを読む
    ///
    /// 終端がなければ入力末尾で閉じる。
    fn read_literal(&mut self, delim: char) {
        let mut literal = String::from(delim);
        let mut special = false;
        while let Some(c) = self.bump() {
            if !special && c == delim {
                break;
            }
            literal.push(c);
            special = !special && c == '\\';
        }
        literal.push(delim);

        if self.current == "#file" {
            let path = &literal[1..literal.len() - 1];
            self.line += 1;
            self.file_stack.push(self.file);
            self.line_stack.push(self.line);
            self.file = self.list.files.register(path);
            self.line = 0;
            trace!(path, file = self.file.as_u32(), "enter #file");
        } else {
            self.flush(false);
            self.push(&literal, false);
        }
        self.current.clear();
    }

    fn separator(&mut self, ch: char) -> Result<(), TokenizeError> {
        match self.current.as_str() {
            // パスはリテラルとして後で読む
            "#file" => return Ok(()),
            "#line" => {
                self.read_line_directive(ch);
                self.current.clear();
                return Ok(());
            }
            "#endfile" => {
                let (Some(line), Some(file)) = (self.line_stack.pop(), self.file_stack.pop()) else {
                    let line = self.line;
                    self.list.deallocate_tokens();
                    return Err(TokenizeError::UnbalancedEndfile { line });
                };
                self.line = line;
                self.file = file;
                self.current.clear();
                return Ok(());
            }
            _ => {}
        }

        // 改行で閉じる字句は展開されたものとして扱わない
        if ch == '\n' {
            self.expanded = false;
        }
        self.flush(true);

        match ch {
            '\n' => {
                if self.list.settings.is_terminated() {
                    return Err(TokenizeError::Terminated);
                }
                self.line += 1;
                Ok(())
            }
            ' ' => Ok(()),
            _ => {
                let op = self.read_operator(ch);
                self.push(&op, false);
                Ok(())
            }
        }
    }

    /// `#line n`: 行末までを読み、次の行の行番号を設定する
    fn read_line_directive(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            return;
        }
        let mut rest = String::new();
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
            rest.push(c);
        }
        match rest.split_whitespace().next().and_then(|s| s.parse::<u32>().ok()) {
            Some(n) => self.line = n,
            None => self.line += 1,
        }
    }

    /// 区切り文字から始まる演算子を最長で読む
    fn read_operator(&mut self, ch: char) -> String {
        let mut op = String::from(ch);
        let next = self.peek();

        if DOUBLED.contains(ch) && next == Some(ch) {
            self.pos += 1;
            op.push(ch);
            if (ch == '<' || ch == '>') && self.peek() == Some('=') {
                self.pos += 1;
                op.push('=');
            }
        } else if COMPOUND.contains(ch) && next == Some('=') {
            self.pos += 1;
            op.push('=');
        } else if ch == '-' && next == Some('>') {
            self.pos += 1;
            op.push('>');
        } else if ch == '.' && next == Some('.') && self.peek_n(1) == Some('.') {
            self.pos += 2;
            op.push_str("..");
        }
        op
    }

    /// 溜めている字句を確定する
    fn flush(&mut self, split: bool) {
        if self.current.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.current);
        self.push(&text, split);
    }

    /// トークンを追加し、展開マーカー状態を記録する
    fn push(&mut self, text: &str, split: bool) {
        let before = self.list.tokens().back();
        if self.list.add_token(text, self.line, self.file, split).is_none() {
            return;
        }
        let chain = self.list.tokens_mut();
        let mut cursor = match before {
            Some(b) => chain.next(b),
            None => chain.front(),
        };
        while let Some(i) = cursor {
            chain[i].set_expanded_macro(self.expanded);
            cursor = chain.next(i);
        }
    }
}
