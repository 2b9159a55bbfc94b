//! 式 AST の構築
//!
//! プライマリ列の演算子トークンに `ast_operand1` / `ast_operand2` を張り、
//! 優先順位表に従って式の森を作る。オペランドは常に隣接トークンが属する
//! 部分木の根を指す。閉じ括弧はリンク先の開き括弧、`name (` は呼び出し括弧で
//! 代表させる。
//!
//! `link_brackets` を先に実行しておく必要がある。

use crate::token::{TokenIndex, TokenKind};
use crate::token_list::{TokenChain, TokenList};

/// 演算子クラス
struct OpClass {
    ops: &'static [&'static str],
    /// 右から左に走査する前置単項クラス
    prefix: bool,
}

const fn binary(ops: &'static [&'static str]) -> OpClass {
    OpClass { ops, prefix: false }
}

/// 優先順位の高い順
const PRECEDENCE: &[OpClass] = &[
    binary(&["::"]),
    binary(&["++", "--", ".", "->", "["]),
    OpClass {
        ops: &["++", "--", "+", "-", "!", "~", "*", "&", "sizeof"],
        prefix: true,
    },
    binary(&["*", "/", "%"]),
    binary(&["+", "-"]),
    binary(&["<<", ">>"]),
    binary(&["<", "<=", ">", ">="]),
    binary(&["==", "!="]),
    binary(&["&"]),
    binary(&["^"]),
    binary(&["|"]),
    binary(&["&&"]),
    binary(&["||"]),
    binary(&[
        "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", "?", ":",
    ]),
    binary(&["throw"]),
    binary(&[","]),
];

/// 直前に来ると前置単項演算子になるキーワード
const PREFIX_KEYWORDS: &[&str] = &["return", "case", "throw", "else", "do"];

#[derive(Clone, Copy)]
enum Slot {
    Operand1,
    Operand2,
}

impl TokenList {
    /// プライマリ列に式 AST を構築する
    ///
    /// 冪等であり、二度目以降の実行はリンクを変更しない。
    pub fn create_ast(&mut self) {
        let chain = self.tokens_mut();
        if chain.front().is_none() {
            return;
        }

        for class in PRECEDENCE {
            if class.prefix {
                let order: Vec<TokenIndex> = chain.indices_rev().collect();
                for idx in order {
                    if class.ops.contains(&chain[idx].text.as_str())
                        && chain[idx].ast_operand1.is_none()
                        && is_prefix_position(chain, idx)
                    {
                        if let Some(rhs) = operand_after(chain, idx) {
                            attach(chain, idx, Slot::Operand1, rhs);
                        }
                    }
                }
            } else {
                let order: Vec<TokenIndex> = chain.indices().collect();
                for idx in order {
                    let token = &chain[idx];
                    if token.ast_operand1.is_some() || !class.ops.contains(&token.text.as_str()) {
                        continue;
                    }
                    if !matches!(token.kind, TokenKind::Operator | TokenKind::Keyword) {
                        continue;
                    }
                    link_binary(chain, idx);
                }
            }
        }

        // 関数呼び出し
        let order: Vec<TokenIndex> = chain.indices().collect();
        for &idx in &order {
            if !chain[idx].is_identifier_like() {
                continue;
            }
            let Some(paren) = chain.next(idx) else { continue };
            if chain[paren].text == "(" && chain[paren].ast_operand1.is_none() {
                attach(chain, paren, Slot::Operand1, idx);
            }
        }

        // 括弧
        for &idx in &order {
            match chain[idx].text.as_str() {
                "(" | "[" => link_bracket_contents(chain, idx),
                ")" | "]" => replace_closing_operand(chain, idx),
                _ => {}
            }
        }
    }
}

fn link_binary(chain: &mut TokenChain, idx: TokenIndex) {
    let text = chain[idx].text.as_str();
    if matches!(text, "++" | "--") {
        // 後置のみ。前置は単項クラスで扱う
        let postfix = chain
            .previous(idx)
            .is_some_and(|p| !chain[p].is_op() || chain[p].is_closing_bracket());
        if postfix {
            if let Some(lhs) = operand_before(chain, idx) {
                attach(chain, idx, Slot::Operand1, lhs);
            }
        }
        return;
    }

    let subscript = text == "[";
    if let Some(lhs) = operand_before(chain, idx) {
        attach(chain, idx, Slot::Operand1, lhs);
    }
    if !subscript {
        if let Some(rhs) = operand_after(chain, idx) {
            attach(chain, idx, Slot::Operand2, rhs);
        }
    }
}

/// 前置単項演算子の位置にあるか
fn is_prefix_position(chain: &TokenChain, idx: TokenIndex) -> bool {
    let Some(prev) = chain.previous(idx) else {
        return true;
    };
    let p = &chain[prev];
    match p.kind {
        TokenKind::Operator => !p.is_closing_bracket() && !(p.is_inc_dec() && p.ast_operand1.is_some()),
        TokenKind::Keyword => PREFIX_KEYWORDS.contains(&p.text.as_str()),
        _ => false,
    }
}

/// 左オペランドの候補（直前のトークン）
fn operand_before(chain: &TokenChain, idx: TokenIndex) -> Option<TokenIndex> {
    let prev = chain.previous(idx)?;
    let token = &chain[prev];
    if !token.is_op() {
        return Some(prev);
    }
    if token.is_closing_bracket() {
        return token.bracket_link;
    }
    token.is_inc_dec().then_some(prev)
}

/// 右オペランドの候補（直後のトークン）
fn operand_after(chain: &TokenChain, idx: TokenIndex) -> Option<TokenIndex> {
    let next = chain.next(idx)?;
    let token = &chain[next];
    if token.is_op() {
        if token.is_closing_bracket() || matches!(token.text.as_str(), ";" | ",") {
            return None;
        }
        return Some(next);
    }
    if token.is_identifier_like() {
        if let Some(paren) = chain.next(next).filter(|&p| chain[p].text == "(") {
            return Some(paren);
        }
    }
    Some(next)
}

/// AST 上の根
fn root(chain: &TokenChain, idx: TokenIndex) -> TokenIndex {
    let mut cur = idx;
    for _ in 0..chain.len() {
        match chain[cur].ast_parent {
            Some(parent) => cur = parent,
            None => break,
        }
    }
    cur
}

/// `node` の属する部分木の根を `op` のオペランドにする
///
/// 同じ木に属していれば何もしない。
fn attach(chain: &mut TokenChain, op: TokenIndex, slot: Slot, node: TokenIndex) {
    let child = root(chain, node);
    if child == root(chain, op) {
        return;
    }

    let old = match slot {
        Slot::Operand1 => chain[op].ast_operand1,
        Slot::Operand2 => chain[op].ast_operand2,
    };
    if let Some(old) = old {
        if chain[old].ast_parent == Some(op) {
            chain[old].ast_parent = None;
        }
    }

    match slot {
        Slot::Operand1 => chain[op].ast_operand1 = Some(child),
        Slot::Operand2 => chain[op].ast_operand2 = Some(child),
    }
    chain[child].ast_parent = Some(op);
}

/// 呼び出し括弧・添字は引数式を operand2 に、グループ化括弧は中身を operand1 に張る
fn link_bracket_contents(chain: &mut TokenChain, idx: TokenIndex) {
    let Some(next) = chain.next(idx) else { return };
    if chain[next].is_closing_bracket() {
        return;
    }

    let is_call = chain.previous(idx).is_some_and(|p| chain[p].is_identifier_like());
    let slot = if chain[idx].text == "[" || is_call {
        Slot::Operand2
    } else {
        Slot::Operand1
    };
    attach(chain, idx, slot, next);
}

/// オペランドになってしまった閉じ括弧を、それが閉じる式の根で置き換える
fn replace_closing_operand(chain: &mut TokenChain, idx: TokenIndex) {
    let Some(parent) = chain[idx].ast_parent else { return };
    chain[idx].ast_parent = None;
    let slot = if chain[parent].ast_operand1 == Some(idx) {
        chain[parent].ast_operand1 = None;
        Slot::Operand1
    } else {
        chain[parent].ast_operand2 = None;
        Slot::Operand2
    };
    if let Some(prev) = chain.previous(idx).filter(|&p| !chain[p].is_opening_bracket()) {
        attach(chain, parent, slot, prev);
    }
}

/// AST を S 式で表す（デバッグ・テスト用）
///
/// 例: `a = b + c` → `(= a (+ b c))`
pub fn ast_sexp(chain: &TokenChain, idx: TokenIndex) -> String {
    fn write(chain: &TokenChain, idx: TokenIndex, depth: usize, out: &mut String) {
        let token = &chain[idx];
        let children: Vec<TokenIndex> = [token.ast_operand1, token.ast_operand2].into_iter().flatten().collect();
        if children.is_empty() || depth > chain.len() {
            out.push_str(&token.text);
            return;
        }
        out.push('(');
        out.push_str(&token.text);
        for child in children {
            out.push(' ');
            write(chain, child, depth + 1, out);
        }
        out.push(')');
    }

    let mut out = String::new();
    write(chain, idx, 0, &mut out);
    out
}

/// 根となっている演算子トークンの S 式を列順に返す
pub fn ast_roots(chain: &TokenChain) -> Vec<String> {
    chain
        .iter()
        .filter(|(_, t)| t.ast_parent.is_none() && (t.ast_operand1.is_some() || t.ast_operand2.is_some()))
        .map(|(i, _)| ast_sexp(chain, i))
        .collect()
}
