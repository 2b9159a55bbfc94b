//! Property-based tests
//!
//! 1. Bracket links are symmetric for balanced input and absent otherwise
//! 2. Hex / octal / binary literals normalize to the decimal token
//! 3. Prefix determination depends only on its inputs
//! 4. Repeated references are reported once
//! 5. Brace newline rule at its boundaries

use pepper_style::naming::{Declaration, required_prefix};
use pepper_style::type_class::type_string;
use pepper_style::{
    Role, Settings, StyleChecker, SymbolTable, TokenKind, TokenList, Variable, Whitelist, annotate,
    get_link, get_link_inverse, link_brackets,
};
use proptest::prelude::*;

fn tokenize(code: &str) -> TokenList {
    let mut list = TokenList::new(Settings::default());
    list.create_tokens(code, "main.cpp", None).unwrap();
    list
}

fn texts(list: &TokenList) -> Vec<String> {
    list.tokens().iter().map(|(_, t)| t.text.clone()).collect()
}

// -- Strategies --

/// Balanced bracket text with short identifiers in between
fn balanced_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![Just(String::new()), "[a-z]{1,3}".prop_map(|s| format!(" {s} "))];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            (0..3usize, inner.clone()).prop_map(|(k, s)| {
                let (open, close) = [("(", ")"), ("[", "]"), ("{", "}")][k];
                format!("{open}{s}{close}")
            }),
            prop::collection::vec(inner, 1..4).prop_map(|parts| parts.concat()),
        ]
    })
}

fn type_strategy() -> impl Strategy<Value = Vec<String>> {
    let types = vec![
        "int",
        "unsigned int",
        "long",
        "char",
        "float",
        "TString",
        "CReader",
        "std :: vector < int >",
        "boost :: shared_ptr < char >",
        "scoped_array < int >",
    ];
    prop::sample::select(types).prop_map(|t| t.split_whitespace().map(String::from).collect())
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(vec![Role::Parameter, Role::Attribute, Role::GlobalVariable, Role::Local])
}

fn whitespace_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec![' ', '\t', '\n']), 0..6)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_links_are_symmetric(body in balanced_strategy()) {
        let code = format!("({body})");
        let mut list = tokenize(&code);
        prop_assert!(link_brackets(list.tokens_mut()).is_empty());

        let chain = list.tokens();
        for (idx, token) in chain.iter() {
            if token.is_opening_bracket() {
                let close = get_link(chain, idx);
                prop_assert!(close.is_some());
                prop_assert_eq!(token.bracket_link, close);
                prop_assert_eq!(close.and_then(|c| get_link_inverse(chain, c)), Some(idx));
            }
        }
    }

    #[test]
    fn prop_truncated_input_has_no_link(body in balanced_strategy()) {
        let list = tokenize(&format!("({body}"));
        let chain = list.tokens();
        let first = chain.front().unwrap();
        prop_assert_eq!(get_link(chain, first), None);

        let list = tokenize(&format!("{body})"));
        let chain = list.tokens();
        let last = chain.back().unwrap();
        prop_assert_eq!(get_link_inverse(chain, last), None);
    }

    #[test]
    fn prop_radix_literals_normalize(n in any::<u32>()) {
        let decimal = texts(&tokenize(&format!("x = {n};")));
        prop_assert_eq!(&texts(&tokenize(&format!("x = {n:#x};"))), &decimal);
        prop_assert_eq!(&texts(&tokenize(&format!("x = {n:#X};"))), &decimal);
        prop_assert_eq!(&texts(&tokenize(&format!("x = 0{n:o};"))), &decimal);
        prop_assert_eq!(&texts(&tokenize(&format!("x = {n:#b};"))), &decimal);
        // 正規化済みの字句は変わらない
        prop_assert_eq!(&texts(&tokenize(&decimal.join(" "))), &decimal);
    }

    #[test]
    fn prop_prefix_is_pure(
        tokens in type_strategy(),
        role in role_strategy(),
        is_pointer in any::<bool>(),
        is_array in any::<bool>(),
        is_class in any::<bool>(),
        noise in type_strategy(),
    ) {
        let var = Variable { type_tokens: tokens, is_pointer, is_array, is_class, ..Variable::default() };
        let ts = type_string(&var.type_tokens);
        let shared = Whitelist::default();

        let first = required_prefix(&shared, &Declaration::of(&var, &ts, role));

        // 別の宣言を挟んでも結果は変わらない
        let other = Variable { type_tokens: noise, ..Variable::default() };
        let other_ts = type_string(&other.type_tokens);
        let _ = required_prefix(&shared, &Declaration::of(&other, &other_ts, Role::Local));

        let second = required_prefix(&shared, &Declaration::of(&var, &ts, role));
        let fresh = required_prefix(&Whitelist::default(), &Declaration::of(&var, &ts, role));
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &fresh);
    }

    #[test]
    fn prop_references_reported_once(count in 1usize..8) {
        let mut table = SymbolTable::new();
        table.add_variable(Variable {
            name: "total".into(),
            type_tokens: vec!["int".into()],
            ..Variable::default()
        });
        let code = "total ;\n".repeat(count);
        let mut list = tokenize(&code);
        link_brackets(list.tokens_mut());
        annotate(&mut list, &table);

        let whitelist = Whitelist::default();
        let mut checker = StyleChecker::new(&whitelist, &table);
        let mut diags = Vec::new();
        checker.check(&list, &mut diags);
        checker.check(&list, &mut diags);
        prop_assert_eq!(diags.len(), 1);
    }

    #[test]
    fn prop_brace_newline_boundary(ws in whitespace_strategy()) {
        let newlines = ws.matches('\n').count();
        for (brace, violates) in [("{", newlines != 1), ("}", newlines == 0)] {
            let raw = format!("x{ws}{brace}");
            let mut list = TokenList::new(Settings::default());
            list.create_tokens("x;\n", "main.cpp", Some(&raw)).unwrap();
            let violations = list
                .raw_tokens()
                .iter()
                .filter(|(_, t)| t.kind == TokenKind::IndentViolation)
                .count();
            prop_assert_eq!(violations, usize::from(violates), "raw: {:?}", raw);
        }
    }
}
