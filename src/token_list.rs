//! トークンリスト
//!
//! トークンはアリーナ (`Vec<Token>`) に格納し、前後リンク・括弧リンク・
//! AST リンクはすべて `TokenIndex` で表す。`TokenList` は意味検査用の
//! プライマリ列と、コメント・インデント違反を持つ raw 列の2本を所有する。

use std::ops::{Index, IndexMut};

use crate::config::Settings;
use crate::source::{DisplayLocation, FileIndex, FileTable};
use crate::token::{Token, TokenFlags, TokenIndex, TokenKind};

/// アリーナ上の双方向連結トークン列
#[derive(Debug, Default, Clone)]
pub struct TokenChain {
    tokens: Vec<Token>,
    front: Option<TokenIndex>,
    back: Option<TokenIndex>,
}

impl TokenChain {
    /// 空の列を作成
    pub fn new() -> Self {
        Self::default()
    }

    pub fn front(&self) -> Option<TokenIndex> {
        self.front
    }

    pub fn back(&self) -> Option<TokenIndex> {
        self.back
    }

    /// アリーナ内のトークン数
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, idx: TokenIndex) -> Option<&Token> {
        self.tokens.get(idx.as_usize())
    }

    pub fn get_mut(&mut self, idx: TokenIndex) -> Option<&mut Token> {
        self.tokens.get_mut(idx.as_usize())
    }

    pub fn next(&self, idx: TokenIndex) -> Option<TokenIndex> {
        self.get(idx).and_then(|t| t.next)
    }

    pub fn previous(&self, idx: TokenIndex) -> Option<TokenIndex> {
        self.get(idx).and_then(|t| t.previous)
    }

    /// `idx` の字句が `text` と一致するか
    pub fn is(&self, idx: Option<TokenIndex>, text: &str) -> bool {
        idx.and_then(|i| self.get(i)).is_some_and(|t| t.text == text)
    }

    /// 末尾に追加
    pub fn push_back(&mut self, mut token: Token) -> TokenIndex {
        let idx = TokenIndex::new(self.tokens.len());
        token.previous = self.back;
        token.next = None;
        self.tokens.push(token);
        match self.back {
            Some(back) => self[back].next = Some(idx),
            None => self.front = Some(idx),
        }
        self.back = Some(idx);
        idx
    }

    /// `after` の直後に挿入
    pub fn insert_after(&mut self, after: TokenIndex, mut token: Token) -> TokenIndex {
        let idx = TokenIndex::new(self.tokens.len());
        let old_next = self[after].next;
        token.previous = Some(after);
        token.next = old_next;
        self.tokens.push(token);
        self[after].next = Some(idx);
        match old_next {
            Some(n) => self[n].previous = Some(idx),
            None => self.back = Some(idx),
        }
        idx
    }

    /// 全トークンを破棄
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.front = None;
        self.back = None;
    }

    /// 列順にイテレート
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain: self,
            cursor: self.front,
        }
    }

    /// 列順の位置をイテレート
    pub fn indices(&self) -> impl Iterator<Item = TokenIndex> + '_ {
        std::iter::successors(self.front, move |&i| self.next(i))
    }

    /// 末尾から先頭へ位置をイテレート
    pub fn indices_rev(&self) -> impl Iterator<Item = TokenIndex> + '_ {
        std::iter::successors(self.back, move |&i| self.previous(i))
    }

    /// `from` から `to` の手前までの字句を空白区切りで連結
    pub fn join_range(&self, from: Option<TokenIndex>, to: TokenIndex) -> String {
        let mut out = String::new();
        let mut cursor = from;
        while let Some(i) = cursor {
            if i == to {
                break;
            }
            out.push_str(&self[i].text);
            out.push(' ');
            cursor = self.next(i);
        }
        out
    }
}

impl Index<TokenIndex> for TokenChain {
    type Output = Token;

    fn index(&self, idx: TokenIndex) -> &Token {
        &self.tokens[idx.as_usize()]
    }
}

impl IndexMut<TokenIndex> for TokenChain {
    fn index_mut(&mut self, idx: TokenIndex) -> &mut Token {
        &mut self.tokens[idx.as_usize()]
    }
}

/// 列順イテレータ
pub struct ChainIter<'a> {
    chain: &'a TokenChain,
    cursor: Option<TokenIndex>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (TokenIndex, &'a Token);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let token = self.chain.get(idx)?;
        self.cursor = token.next;
        Some((idx, token))
    }
}

/// 1翻訳単位分のトークンリスト
#[derive(Debug, Clone, Default)]
pub struct TokenList {
    primary: TokenChain,
    raw: TokenChain,
    pub(crate) files: FileTable,
    pub(crate) settings: Settings,
}

impl TokenList {
    /// 新しいトークンリストを作成
    pub fn new(settings: Settings) -> Self {
        Self {
            primary: TokenChain::new(),
            raw: TokenChain::new(),
            files: FileTable::new(),
            settings,
        }
    }

    /// プライマリ列
    pub fn tokens(&self) -> &TokenChain {
        &self.primary
    }

    pub fn tokens_mut(&mut self) -> &mut TokenChain {
        &mut self.primary
    }

    /// raw 列（コメント・インデント違反）
    pub fn raw_tokens(&self) -> &TokenChain {
        &self.raw
    }

    pub fn files(&self) -> &FileTable {
        &self.files
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// プライマリ列の末尾にトークンを追加
    ///
    /// `##` を含む字句は `split` 指定時に分割する。16進・8進・2進リテラルは
    /// 10進に、`_Bool` は `bool` に書き換える。
    pub fn add_token(&mut self, text: &str, line: u32, file_index: FileIndex, split: bool) -> Option<TokenIndex> {
        if text.is_empty() {
            return None;
        }

        if split && text.contains("##") {
            let mut last = None;
            let mut parts = text.split("##").peekable();
            while let Some(part) = parts.next() {
                if let Some(i) = self.add_token(part, line, file_index, false) {
                    last = Some(i);
                }
                if parts.peek().is_some() {
                    last = self.add_token("##", line, file_index, false);
                }
            }
            return last;
        }

        let normalized = if let Some(decimal) = crate::number::to_decimal(text) {
            decimal
        } else if text == "_Bool" {
            "bool".to_string()
        } else {
            text.to_string()
        };

        Some(self.primary.push_back(Token::new(normalized, line, file_index)))
    }

    /// 別トークンの意味情報を引き継いで末尾に追加
    pub fn add_token_copy(&mut self, src: &Token, line: u32, file_index: FileIndex) -> TokenIndex {
        self.primary.push_back(src.copy_semantics(line, file_index))
    }

    /// raw 列に合成トークンを追加
    pub fn add_raw_token(&mut self, text: &str, line: u32, file_index: FileIndex, kind: TokenKind) -> TokenIndex {
        self.raw.push_back(Token::with_kind(text, kind, line, file_index))
    }

    /// `src` から `n` 個のトークンをコピーして `dest` の後ろに挿入する
    ///
    /// コピーした括弧同士はスタックで相互リンクする。
    pub fn insert_tokens(&mut self, dest: TokenIndex, src: TokenIndex, n: usize) {
        let sources: Vec<Token> = std::iter::successors(Some(src), |&i| self.primary.next(i))
            .take(n)
            .map(|i| {
                let t = &self.primary[i];
                let mut copy = t.copy_semantics(t.line, t.file_index);
                copy.flags = t.flags;
                copy
            })
            .collect();

        let mut stack: Vec<TokenIndex> = Vec::new();
        let mut cursor = dest;
        for token in sources {
            cursor = self.primary.insert_after(cursor, token);
            let text = self.primary[cursor].text.as_str();
            if matches!(text, "(" | "[" | "{") {
                stack.push(cursor);
            } else if matches!(text, ")" | "]" | "}") {
                if let Some(open) = stack.pop() {
                    self.primary[open].bracket_link = Some(cursor);
                    self.primary[cursor].bracket_link = Some(open);
                }
            }
        }
    }

    /// 全トークンとファイルテーブルを破棄
    pub fn deallocate_tokens(&mut self) {
        self.primary.clear();
        self.raw.clear();
        self.files.clear();
    }

    /// トークンの属するファイル名
    pub fn file(&self, token: &Token) -> Option<&str> {
        self.files.get(token.file_index)
    }

    /// `file:line` 形式の位置文字列
    pub fn file_line(&self, token: &Token) -> String {
        DisplayLocation {
            loc: token.location(),
            files: &self.files,
        }
        .to_string()
    }

    /// マクロ展開由来のトークン数（診断ログ用）
    pub fn expanded_token_count(&self) -> usize {
        self.primary
            .iter()
            .filter(|(_, t)| t.flags.contains(TokenFlags::EXPANDED_FROM_MACRO))
            .count()
    }
}
