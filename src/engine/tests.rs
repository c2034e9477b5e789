#![allow(clippy::unwrap_used)]

use super::*;

fn pattern(wildcard: &str) -> Pattern {
    Pattern {
        pattern: wildcard.to_string(),
        ..Pattern::default()
    }
}

fn mappings(entries: &[(&str, &str)]) -> Mappings {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// --- match_file ---

#[test]
fn non_abstract_match_includes_the_file() {
    let engine = Engine::new();
    let patterns = vec![pattern("/**/*")];
    let (include, matched) = engine.match_file("/src/main.rs", &patterns).unwrap();
    assert!(include);
    assert_eq!(matched.len(), 1);
}

#[test]
fn abstract_patterns_alone_never_include() {
    let engine = Engine::new();
    let patterns = vec![Pattern {
        pattern: "/**/*".to_string(),
        r#abstract: true,
        default: mappings(&[("a", "b")]),
        ..Pattern::default()
    }];
    let (include, matched) = engine.match_file("/src/main.rs", &patterns).unwrap();
    assert!(!include, "abstract match must not include");
    assert_eq!(matched.len(), 1, "but its mappings are still collected");
}

#[test]
fn abstract_plus_concrete_includes_and_collects_both() {
    let engine = Engine::new();
    let patterns = vec![
        Pattern {
            pattern: "/**/*".to_string(),
            r#abstract: true,
            ..Pattern::default()
        },
        pattern("/src/**/*"),
    ];
    let (include, matched) = engine.match_file("/src/main.rs", &patterns).unwrap();
    assert!(include);
    assert_eq!(matched.len(), 2);
}

#[test]
fn exception_unclaims_the_file() {
    let engine = Engine::new();
    let patterns = vec![Pattern {
        pattern: "/**/*".to_string(),
        except: vec!["/vendor/**".to_string()],
        ..Pattern::default()
    }];
    let (include, matched) = engine.match_file("/vendor/lib.rs", &patterns).unwrap();
    assert!(!include);
    assert!(matched.is_empty());
}

#[test]
fn always_ignored_paths_are_never_claimed() {
    let engine = Engine::new();
    let patterns = vec![pattern("/**/*")];
    for file in ["/.git/config", "/.sombra/default.yaml", "/.idea/x.xml"] {
        let (include, matched) = engine.match_file(file, &patterns).unwrap();
        assert!(!include, "{file} should be ignored");
        assert!(matched.is_empty());
    }
}

#[test]
fn malformed_pattern_wildcard_is_a_silent_non_match() {
    let engine = Engine::new();
    let patterns = vec![pattern("["), pattern("/**/*")];
    let (include, matched) = engine.match_file("/a.txt", &patterns).unwrap();
    assert!(include);
    assert_eq!(matched.len(), 1);
}

#[test]
fn malformed_exception_wildcard_is_fatal() {
    let engine = Engine::new();
    let patterns = vec![Pattern {
        pattern: "/**/*".to_string(),
        except: vec!["[".to_string()],
        ..Pattern::default()
    }];
    assert!(engine.match_file("/a.txt", &patterns).is_err());
}

#[test]
fn declaration_order_is_preserved() {
    let engine = Engine::new();
    let patterns = vec![pattern("/src/**/*"), pattern("/**/*")];
    let (_, matched) = engine.match_file("/src/a.rs", &patterns).unwrap();
    let order: Vec<&str> = matched.iter().map(|p| p.pattern.as_str()).collect();
    assert_eq!(order, vec!["/src/**/*", "/**/*"]);
}

// --- combine ---

#[test]
fn default_feeds_all_three_categories() {
    let engine = Engine::new();
    let p = Pattern {
        pattern: "/**/*".to_string(),
        default: mappings(&[("old", "new")]),
        ..Pattern::default()
    };
    let res = engine.combine(&[&p]);
    for list in [&res.path, &res.name, &res.content] {
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].key, "old");
        assert_eq!(list[0].value, "new");
    }
}

#[test]
fn category_map_overrides_default_on_the_same_selector() {
    let engine = Engine::new();
    let p = Pattern {
        pattern: "/**/*".to_string(),
        default: mappings(&[("k", "default")]),
        content: mappings(&[("k", "content")]),
        ..Pattern::default()
    };
    let res = engine.combine(&[&p]);
    assert_eq!(res.content[0].value, "content");
    assert_eq!(res.path[0].value, "default");
}

#[test]
fn later_pattern_wins_on_collision() {
    let engine = Engine::new();
    let first = Pattern {
        pattern: "/**/*".to_string(),
        content: mappings(&[("k", "first")]),
        ..Pattern::default()
    };
    let second = Pattern {
        pattern: "/**/*".to_string(),
        content: mappings(&[("k", "second")]),
        ..Pattern::default()
    };
    let res = engine.combine(&[&first, &second]);
    assert_eq!(res.content[0].value, "second");
}

#[test]
fn lists_are_sorted_longest_selector_first() {
    let engine = Engine::new();
    let p = Pattern {
        pattern: "/**/*".to_string(),
        content: mappings(&[
            ("com.example", "B"),
            ("com.example.myproject", "A"),
            ("com", "C"),
        ]),
        ..Pattern::default()
    };
    let res = engine.combine(&[&p]);
    let keys: Vec<&str> = res.content.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["com.example.myproject", "com.example", "com"]);
}

#[test]
fn equal_length_selectors_tie_break_lexicographically() {
    let engine = Engine::new();
    let p = Pattern {
        pattern: "/**/*".to_string(),
        content: mappings(&[("bb", "2"), ("aa", "1"), ("cc", "3")]),
        ..Pattern::default()
    };
    let res = engine.combine(&[&p]);
    let keys: Vec<&str> = res.content.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["aa", "bb", "cc"]);
}

#[test]
fn verbatim_empties_content_only() {
    let engine = Engine::new();
    let mapped = Pattern {
        pattern: "/**/*".to_string(),
        default: mappings(&[("a", "b")]),
        ..Pattern::default()
    };
    let verbatim = Pattern {
        pattern: "/**/*".to_string(),
        verbatim: true,
        ..Pattern::default()
    };
    let res = engine.combine(&[&mapped, &verbatim]);
    assert!(res.content.is_empty());
    assert_eq!(res.path.len(), 1);
    assert_eq!(res.name.len(), 1);

    // The file's bytes pass through untouched.
    let body = b"a stays a".to_vec();
    assert_eq!(engine.new_content(&body, &res.content).unwrap(), body);
}

// --- new_file / new_content ---

#[test]
fn new_file_rewrites_prefix_and_name_separately() {
    let engine = Engine::new();
    let res = engine.combine(&[&Pattern {
        pattern: "/**/*".to_string(),
        path: mappings(&[("src", "lib")]),
        name: mappings(&[("main", "start")]),
        ..Pattern::default()
    }]);
    let got = engine.new_file("/src/main.rs", &res.path, &res.name).unwrap();
    assert_eq!(got, "/lib/start.rs");
}

#[test]
fn new_file_keeps_the_leading_slash() {
    let engine = Engine::new();
    let res = engine.combine(&[&Pattern {
        pattern: "/**/*".to_string(),
        path: mappings(&[("/src", "")]),
        ..Pattern::default()
    }]);
    let got = engine.new_file("/src/main.rs", &res.path, &res.name).unwrap();
    assert_eq!(got, "/main.rs");
}

#[test]
fn new_file_relocation_into_a_directory() {
    let engine = Engine::new();
    let res = engine.combine(&[&Pattern {
        pattern: "/LICENSE".to_string(),
        path: mappings(&[("/", "/vendors")]),
        name: mappings(&[("LICENSE", "deadbeef.LICENSE")]),
        ..Pattern::default()
    }]);
    let got = engine.new_file("/LICENSE", &res.path, &res.name).unwrap();
    assert_eq!(got, "/vendors/deadbeef.LICENSE");
}

#[test]
fn new_file_without_a_leading_slash_stays_bare() {
    let engine = Engine::new();
    let got = engine
        .new_file("dev/null", &MapList::new(), &MapList::new())
        .unwrap();
    assert_eq!(got, "dev/null");
}

#[test]
fn new_content_is_identity_under_the_empty_list() {
    let engine = Engine::new();
    let body = b"anything at all".to_vec();
    assert_eq!(engine.new_content(&body, &MapList::new()).unwrap(), body);
}
