//! 数値リテラルの判定と10進正規化
//!
//! 16進・8進・2進リテラルはトークン化時に10進表記へ書き換える。

/// 符号と整数サフィックスを取り除いた本体を返す
fn strip_sign_and_suffix(s: &str) -> (bool, &str) {
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let body = body.trim_end_matches(['u', 'U', 'l', 'L']);
    (negative, body)
}

/// 16進リテラルか (`0x1F`, `-0XffUL`)
pub fn is_hex(s: &str) -> bool {
    let (_, body) = strip_sign_and_suffix(s);
    match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// 8進リテラルか (`0777`)。`0` 単独は含まない
pub fn is_oct(s: &str) -> bool {
    let (_, body) = strip_sign_and_suffix(s);
    match body.strip_prefix('0') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| (b'0'..=b'7').contains(&b)),
        None => false,
    }
}

/// 2進リテラルか (`0b1010`)
pub fn is_bin(s: &str) -> bool {
    let (_, body) = strip_sign_and_suffix(s);
    match body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b == b'0' || b == b'1'),
        None => false,
    }
}

/// 16進・8進・2進リテラルを10進文字列に変換する
///
/// 対象外の文字列や64bitに収まらない値は `None`。
pub fn to_decimal(s: &str) -> Option<String> {
    let (negative, body) = strip_sign_and_suffix(s);
    let value = if is_hex(s) {
        u64::from_str_radix(&body[2..], 16).ok()?
    } else if is_bin(s) {
        u64::from_str_radix(&body[2..], 2).ok()?
    } else if is_oct(s) {
        u64::from_str_radix(&body[1..], 8).ok()?
    } else {
        return None;
    };
    if negative {
        let signed = i64::try_from(value).ok()?;
        Some((-signed).to_string())
    } else {
        Some(value.to_string())
    }
}
