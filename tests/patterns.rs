use globtree::{Pattern, PatternError, PatternOpts};

#[test]
fn building_patterns() {
    for valid in [
        "a", "a/b", "a//b", "/a/b/", "/a//b//", "./a", "a/./b", "*", "**", "**/*", "/**",
        "*.txt;*.csv", "a;", "[abc]", "a\\b",
    ] {
        assert!(
            Pattern::new(valid).is_ok(),
            "Valid pattern '{valid}' was rejected"
        );
    }

    for invalid in [
        "", ".", "./", "/", "//", "/./.", ";", "a/..", "../a", "**a", "a**", "[abc", "[]",
        "a]", "{a", "x}", "{name}/*.cs",
    ] {
        assert!(
            matches!(Pattern::new(invalid), Err(PatternError::Malformed { .. })),
            "Invalid pattern '{invalid}' is unexpectedly considered valid"
        );
    }
}

#[test]
fn matching_patterns() {
    test_pattern(PatternTest {
        pattern_str: "*",
        should_match: &["a", "ab", "/a", "/a/b", "a/"],
        should_not_match: &["", "/"],
    });

    test_pattern(PatternTest {
        pattern_str: "*.txt",
        should_match: &["a.txt", "/dir/a.txt", "dir/sub/a.b.txt"],
        should_not_match: &[".txt", "/dir/.txt", "a.txt/b", "a.txts", "a.TXT"],
    });

    test_pattern(PatternTest {
        pattern_str: "literal",
        should_match: &["literal", "/literal", "/dir/literal"],
        should_not_match: &["litera", "literall", "/dir/aliteral", "", "/"],
    });

    test_pattern(PatternTest {
        pattern_str: "a/b",
        should_match: &["a/b", "/a/b", "/x/a/b"],
        should_not_match: &["a", "b", "/xa/b", "/a/b/c", "/a/x/b"],
    });

    for pattern_str in ["**/*", "**/**/*"] {
        test_pattern(PatternTest {
            pattern_str,
            should_match: &["a", "a/b", "/a", "/a/b/c"],
            should_not_match: &["", "/"],
        });
    }

    test_pattern(PatternTest {
        pattern_str: "**/[bhi].txt",
        should_match: &["b.txt", "/a/e/f/g/h.txt", "/i.txt"],
        should_not_match: &["/a/c.txt", "/a/bh.txt", "/a/b.txt/x"],
    });

    test_pattern(PatternTest {
        pattern_str: "a/**/b",
        should_match: &["a/b", "/a/b", "/a/x/b", "/a/x/y/b", "/w/a/x/b"],
        should_not_match: &["/a/xb", "/ab", "/a/b/c"],
    });

    test_pattern(PatternTest {
        pattern_str: "a/**",
        should_match: &["a/b", "/a/b/c", "/w/a/b"],
        should_not_match: &["a", "/a", "/ab/c"],
    });

    for pattern_str in ["/**", "/**/**"] {
        test_pattern(PatternTest {
            pattern_str,
            should_match: &["/a", "/a/b", "/a/b/c"],
            should_not_match: &["", "a", "a/b", "/"],
        });
    }

    test_pattern(PatternTest {
        pattern_str: "/a/*.txt",
        should_match: &["/a/b.txt", "/a//b.txt"],
        should_not_match: &["a/b.txt", "/w/a/b.txt", "/a/b/c.txt"],
    });

    test_pattern(PatternTest {
        pattern_str: "a[bcd]e",
        should_match: &["abe", "ace", "ade"],
        should_not_match: &["ae", "aee", "b", "c", "d", "abbe"],
    });

    test_pattern(PatternTest {
        pattern_str: "app.*",
        should_match: &["app", "app.", "app.config", "/dir/app.exe.config"],
        should_not_match: &["apps", "/dir/xapp", "application.config"],
    });

    test_pattern(PatternTest {
        pattern_str: "app.*/x",
        should_match: &["app.d/x"],
        should_not_match: &["app/x", "app./x"],
    });

    test_pattern(PatternTest {
        pattern_str: "**/*.*",
        should_match: &["a", "a.b", "/.k", "/a/b/c.d", "/a/Makefile"],
        should_not_match: &["", "/"],
    });

    test_pattern(PatternTest {
        pattern_str: "*.cs;*.vb",
        should_match: &["a.cs", "/dir/b.vb"],
        should_not_match: &["a.fs", "/dir/cs", "/dir/vb"],
    });

    test_pattern(PatternTest {
        pattern_str: "./src/./*.rs",
        should_match: &["src/lib.rs", "/crate/src/main.rs"],
        should_not_match: &["lib.rs", "/crate/src/sub/lib.rs"],
    });

    test_pattern(PatternTest {
        pattern_str: "src\\*.rs",
        should_match: &["src/lib.rs", "src\\lib.rs", "/crate/src/main.rs"],
        should_not_match: &["lib.rs"],
    });
}

#[test]
fn case_insensitive_patterns() {
    let pattern = Pattern::new_with_opts(
        "Src/*.TXT",
        PatternOpts {
            case_insensitive: true,
        },
    )
    .unwrap();

    for path in ["src/a.txt", "SRC/A.TXT", "/x/Src/b.Txt"] {
        assert!(pattern.is_match(path), "Pattern did not match path '{path}'");
    }

    assert!(!pattern.is_match("src/a.csv"));
    assert!(!compile_pattern("Src/*.TXT").is_match("src/a.txt"));
}

#[test]
fn regex_output() {
    let pattern = compile_pattern("**/[bhi].txt");

    assert_eq!(pattern.to_regex(), r"([^/\:]+/)*/(b|h|i)\.txt$");
    assert!(pattern.is_match("/a/e/f/g/h.txt"));

    assert_eq!(compile_pattern("/a/b").to_regex(), r"^/a/b$");
    assert_eq!(
        compile_pattern("*.cs;/*.vb").to_regex(),
        r"(?:/[^/\:]+?\.cs$)|(?:^/[^/\:]+?\.vb$)"
    );
}

#[test]
fn normalized_text() {
    for (input, expected) in [
        ("./a//./b/", "a/b"),
        ("/a/**/**/b", "/a/**/b"),
        ("a\\b", "a/b"),
        ("*.cs;;*.vb;", "*.cs;*.vb"),
        ("*.cs;./*.cs", "*.cs"),
    ] {
        assert_eq!(compile_pattern(input).as_str(), expected);
        assert_eq!(compile_pattern(input).to_string(), expected);
    }

    let multi = compile_pattern("a;/b");
    assert_eq!(multi.sub_patterns().collect::<Vec<_>>(), ["a", "/b"]);
}

#[test]
fn recompiling_is_stable() {
    for pattern_str in ["**/*.txt", "/a/[bc]/*.*", "x;y/**/z"] {
        let a = compile_pattern(pattern_str);
        let b = compile_pattern(pattern_str);

        assert_eq!(a, b);
        assert!(!Pattern::ptr_eq(&a, &b));
        assert_eq!(a.to_regex(), b.to_regex());

        for path in ["/a/b/c.txt", "/a/b/d", "/y/z", "x"] {
            assert_eq!(a.is_match(path), b.is_match(path));
        }
    }
}

#[test]
fn rooted_patterns() {
    assert!(compile_pattern("/a").is_rooted());
    assert!(compile_pattern("/a;/b").is_rooted());
    assert!(!compile_pattern("/a;b").is_rooted());
    assert!(!compile_pattern("a").is_rooted());
}

fn compile_pattern(pattern: &str) -> Pattern {
    Pattern::new(pattern)
        .unwrap_or_else(|err| panic!("Failed to compile pattern '{pattern}':\n  > {err:?}"))
}

struct PatternTest {
    pattern_str: &'static str,
    should_match: &'static [&'static str],
    should_not_match: &'static [&'static str],
}

fn test_pattern(test: PatternTest) {
    let PatternTest {
        pattern_str,
        should_match,
        should_not_match,
    } = test;

    let pattern = compile_pattern(pattern_str);

    for path in should_match {
        assert!(
            pattern.is_match(path),
            "Pattern '{pattern_str}' did not match path '{path}'"
        );
    }

    for path in should_not_match {
        assert!(
            !pattern.is_match(path),
            "Pattern '{pattern_str}' unexpectedly matched path '{path}'"
        );
    }
}
