//! Tokenizer, bracket linker and AST integration tests

use pepper_style::{
    FileIndex, Settings, TokenIndex, TokenKind, TokenList, ast_roots, get_link, get_link_inverse,
    link_brackets,
};
use pretty_assertions::assert_eq;

/// Helper to tokenize a source string
fn tokenize(code: &str) -> TokenList {
    let mut list = TokenList::new(Settings::default());
    list.create_tokens(code, "main.cpp", None).unwrap();
    list
}

fn texts(list: &TokenList) -> Vec<String> {
    list.tokens().iter().map(|(_, t)| t.text.clone()).collect()
}

/// (text, file, line)
fn positions(list: &TokenList) -> Vec<(String, u32, u32)> {
    list.tokens()
        .iter()
        .map(|(_, t)| (t.text.clone(), t.file_index.as_u32(), t.line))
        .collect()
}

fn find(list: &TokenList, text: &str) -> TokenIndex {
    list.tokens()
        .iter()
        .find(|(_, t)| t.text == text)
        .map(|(i, _)| i)
        .unwrap()
}

#[test]
fn test_declaration_tokens() {
    let list = tokenize("unsigned int p_uCount = 0777;\n_Bool bDone;\n");
    assert_eq!(
        texts(&list),
        ["unsigned", "int", "p_uCount", "=", "511", ";", "bool", "bDone", ";"]
    );
    assert_eq!(list.tokens()[find(&list, "bool")].kind, TokenKind::Keyword);
}

#[test]
fn test_binary_literal() {
    let list = tokenize("mask = 0b1010;");
    assert_eq!(texts(&list), ["mask", "=", "10", ";"]);
}

#[test]
fn test_virtual_includes() {
    let code = "a\n#file \"inc/reader.h\"\nb\nc\n#endfile\nd\n";
    let list = tokenize(code);
    assert_eq!(
        positions(&list),
        [
            ("a".to_string(), 0, 1),
            ("b".to_string(), 1, 1),
            ("c".to_string(), 1, 2),
            ("d".to_string(), 0, 3),
        ]
    );
    assert_eq!(list.files().get(FileIndex::from(1)), Some("inc/reader.h"));
}

#[test]
fn test_same_include_registered_once() {
    let code = "#file \"inc/a.h\"\nx\n#endfile\n#file \"inc/./a.h\"\ny\n#endfile\n";
    let list = tokenize(code);
    assert_eq!(list.files().len(), 2);
    let files: Vec<u32> = list.tokens().iter().map(|(_, t)| t.file_index.as_u32()).collect();
    assert_eq!(files, [1, 1]);
}

#[test]
fn test_line_directive() {
    let list = tokenize("a\n#line 40\nb\n");
    assert_eq!(positions(&list), [("a".to_string(), 0, 1), ("b".to_string(), 0, 40)]);
}

#[test]
fn test_macro_marker() {
    let list = tokenize("x = \u{1}MAX_SIZE;\ny = 1;\n");
    let expanded: Vec<(String, bool)> = list
        .tokens()
        .iter()
        .map(|(_, t)| (t.text.clone(), t.is_expanded_macro()))
        .collect();
    assert_eq!(expanded[0], ("x".to_string(), false));
    assert_eq!(expanded[2], ("MAX_SIZE".to_string(), true));
    assert_eq!(expanded[4], ("y".to_string(), false));
}

#[test]
fn test_base_paths_make_includes_relative() {
    let settings = Settings::with_base_paths(vec!["/home/dev/terminal".into()]);
    let mut list = TokenList::new(settings);
    list.create_tokens(
        "#file \"/home/dev/terminal/inc/a.h\"\nx\n#endfile\n",
        "/home/dev/terminal/main.cpp",
        None,
    )
    .unwrap();
    assert_eq!(list.files().get(FileIndex::ROOT), Some("/home/dev/terminal/main.cpp"));
    assert_eq!(list.files().get(FileIndex::from(1)), Some("inc/a.h"));
}

#[test]
fn test_raw_tokens_follow_includes() {
    let raw = "int a; //xx one\n#file \"inc/b.h\"\n/* two */\n#endfile\n{ }\n";
    let mut list = TokenList::new(Settings::default());
    // raw 側の #file はプライマリ側で登録済みのパスだけ解決される
    list.create_tokens("int a;\n#file \"inc/b.h\"\n#endfile\n", "main.cpp", Some(raw))
        .unwrap();

    let raw_tokens: Vec<(String, TokenKind, u32, u32)> = list
        .raw_tokens()
        .iter()
        .map(|(_, t)| (t.text.clone(), t.kind, t.file_index.as_u32(), t.line))
        .collect();
    assert_eq!(
        raw_tokens,
        [
            ("//xx one".to_string(), TokenKind::Comment, 0, 1),
            ("/* two */".to_string(), TokenKind::Comment, 1, 1),
            ("}".to_string(), TokenKind::IndentViolation, 0, 2),
        ]
    );
}

#[test]
fn test_links_for_nested_brackets() {
    let mut list = tokenize("f(a[i], {b}) ;");
    assert!(link_brackets(list.tokens_mut()).is_empty());

    let chain = list.tokens();
    let open = find(&list, "(");
    let close = find(&list, ")");
    assert_eq!(chain[open].bracket_link, Some(close));
    assert_eq!(chain[close].bracket_link, Some(open));
    assert_eq!(get_link(chain, open), Some(close));
    assert_eq!(get_link_inverse(chain, close), Some(open));
}

#[test]
fn test_template_angle_is_computed_not_stored() {
    let mut list = tokenize("std::map<int, std::vector<int> > m;");
    link_brackets(list.tokens_mut());
    let chain = list.tokens();
    let open = find(&list, "<");
    assert_eq!(chain[open].bracket_link, None);
    let close = get_link(chain, open).unwrap();
    assert_eq!(chain.next(close).map(|n| chain[n].text.as_str()), Some("m"));
}

#[test]
fn test_unmatched_brackets_reported() {
    let mut list = tokenize("if (a { b; )");
    let unmatched = link_brackets(list.tokens_mut());
    let texts: Vec<&str> = unmatched.iter().map(|&i| list.tokens()[i].text.as_str()).collect();
    assert_eq!(texts, ["{"]);
}

#[test]
fn test_ast_for_statements() {
    let mut list = tokenize("a = b + c * d;\nx = f(a, b + 1);\nv[i + 1] = 0;\n");
    link_brackets(list.tokens_mut());
    list.create_ast();
    assert_eq!(
        ast_roots(list.tokens()),
        [
            "(= a (+ b (* c d)))",
            "(= x (( f (, a (+ b 1))))",
            "(= ([ v (+ i 1)) 0)",
        ]
    );
}
