//! 括弧の対応付け
//!
//! 括弧の種類ごとに深さを数えて対応する括弧を探す。`<` `>` は比較演算子と
//! 区別できないため保存せず、必要な時に [`get_link`] で求める。

use tracing::warn;

use crate::token::TokenIndex;
use crate::token_list::TokenChain;

/// 開き括弧に対応する閉じ括弧
pub fn closing_of(open: &str) -> Option<&'static str> {
    match open {
        "(" => Some(")"),
        "[" => Some("]"),
        "{" => Some("}"),
        "<" => Some(">"),
        _ => None,
    }
}

/// 閉じ括弧に対応する開き括弧
pub fn opening_of(close: &str) -> Option<&'static str> {
    match close {
        ")" => Some("("),
        "]" => Some("["),
        "}" => Some("{"),
        ">" => Some("<"),
        _ => None,
    }
}

/// 字句に含まれる括弧 `bracket` の数
///
/// 字句解析は `>>` を1字句にまとめるので、`>` としては2つに数える。
fn bracket_count(text: &str, bracket: &str) -> usize {
    if text == bracket {
        1
    } else if bracket == ">" && text == ">>" {
        2
    } else {
        0
    }
}

/// 同じ種類の括弧の深さを数えながら走査する
fn scan<I>(chain: &TokenChain, cursor: I, open: &str, close: &str) -> Option<TokenIndex>
where
    I: Iterator<Item = TokenIndex>,
{
    let mut depth = 0usize;
    for i in cursor {
        let text = chain[i].text.as_str();
        depth += bracket_count(text, open);
        let closes = bracket_count(text, close);
        if closes > 0 {
            if depth == 0 {
                return None;
            }
            if depth <= closes {
                return Some(i);
            }
            depth -= closes;
        }
    }
    None
}

/// 開き括弧から前方に対応する閉じ括弧を探す
///
/// 括弧でないトークンや、対応が見つからないまま末尾に達した場合は `None`。
pub fn get_link(chain: &TokenChain, idx: TokenIndex) -> Option<TokenIndex> {
    let open = chain.get(idx)?.text.as_str();
    let close = closing_of(open)?;
    let forward = std::iter::successors(Some(idx), |&i| chain.next(i));
    scan(chain, forward, open, close)
}

/// 閉じ括弧から後方に対応する開き括弧を探す
pub fn get_link_inverse(chain: &TokenChain, idx: TokenIndex) -> Option<TokenIndex> {
    let close = chain.get(idx)?.text.as_str();
    let open = opening_of(close)?;
    let backward = std::iter::successors(Some(idx), |&i| chain.previous(i));
    scan(chain, backward, close, open)
}

/// `()` `[]` `{}` の対応を `bracket_link` に書き込む
///
/// 種類ごとのスタックで対応を取り、対応の無い括弧の位置を返す。
pub fn link_brackets(chain: &mut TokenChain) -> Vec<TokenIndex> {
    const KINDS: [(&str, &str); 3] = [("(", ")"), ("[", "]"), ("{", "}")];

    let mut stacks: [Vec<TokenIndex>; 3] = Default::default();
    let mut unmatched = Vec::new();
    let order: Vec<TokenIndex> = chain.indices().collect();

    for idx in order {
        let text = chain[idx].text.as_str();
        let Some((k, is_open)) = KINDS.iter().enumerate().find_map(|(k, (o, c))| {
            if text == *o {
                Some((k, true))
            } else if text == *c {
                Some((k, false))
            } else {
                None
            }
        }) else {
            continue;
        };

        if is_open {
            stacks[k].push(idx);
        } else if let Some(open) = stacks[k].pop() {
            chain[open].bracket_link = Some(idx);
            chain[idx].bracket_link = Some(open);
        } else {
            unmatched.push(idx);
        }
    }

    unmatched.extend(stacks.into_iter().flatten());
    unmatched.sort();
    for &idx in &unmatched {
        let token = &chain[idx];
        warn!(text = %token.text, line = token.line, "unmatched bracket");
    }
    unmatched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileIndex;
    use crate::token::Token;

    fn chain_of(src: &str) -> TokenChain {
        let mut chain = TokenChain::new();
        for word in src.split_whitespace() {
            chain.push_back(Token::new(word, 1, FileIndex::ROOT));
        }
        chain
    }

    fn nth(chain: &TokenChain, n: usize) -> TokenIndex {
        chain.indices().nth(n).unwrap()
    }

    #[test]
    fn test_get_link_nested() {
        let chain = chain_of("f ( a [ 1 ] , ( b ) ) ;");
        let open = nth(&chain, 1);
        let close = nth(&chain, 10);
        assert_eq!(get_link(&chain, open), Some(close));
        assert_eq!(get_link_inverse(&chain, close), Some(open));

        assert_eq!(get_link(&chain, nth(&chain, 3)), Some(nth(&chain, 5)));
        assert_eq!(get_link(&chain, nth(&chain, 0)), None);
    }

    #[test]
    fn test_get_link_template() {
        let chain = chain_of("map < int , vector < int > > x ;");
        assert_eq!(get_link(&chain, nth(&chain, 1)), Some(nth(&chain, 8)));
        assert_eq!(get_link_inverse(&chain, nth(&chain, 7)), Some(nth(&chain, 5)));
    }

    #[test]
    fn test_get_link_joined_closing_angles() {
        let chain = chain_of("map < int , vector < int >> x ;");
        assert_eq!(get_link(&chain, nth(&chain, 1)), Some(nth(&chain, 7)));
        assert_eq!(get_link(&chain, nth(&chain, 5)), Some(nth(&chain, 7)));

        let chain = chain_of("a < b >> c");
        assert_eq!(get_link(&chain, nth(&chain, 1)), Some(nth(&chain, 3)));
    }

    #[test]
    fn test_truncated_returns_none() {
        let chain = chain_of("( ( a )");
        assert_eq!(get_link(&chain, nth(&chain, 0)), None);
        let chain = chain_of("a ) )");
        assert_eq!(get_link_inverse(&chain, nth(&chain, 2)), None);
    }

    #[test]
    fn test_link_brackets() {
        let mut chain = chain_of("{ ( a ] ) } )");
        let unmatched = link_brackets(&mut chain);

        assert_eq!(chain[nth(&chain, 0)].bracket_link, Some(nth(&chain, 5)));
        assert_eq!(chain[nth(&chain, 1)].bracket_link, Some(nth(&chain, 4)));
        assert_eq!(chain[nth(&chain, 3)].bracket_link, None);
        assert_eq!(unmatched, vec![nth(&chain, 3), nth(&chain, 6)]);
    }

    #[test]
    fn test_angle_brackets_are_not_stored() {
        let mut chain = chain_of("a < b > c");
        assert!(link_brackets(&mut chain).is_empty());
        assert!(chain.iter().all(|(_, t)| t.bracket_link.is_none()));
    }
}
