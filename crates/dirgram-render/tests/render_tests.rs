use std::collections::HashSet;
use std::fs;

use dirgram_core::{
    Beyond, ConfigError, ConfigOverride, Entry, FirstKind, Formatter, ItemLimit, ListError,
    ListErrorKind, Mask, NodeId, NodeKind, RenderConfig, RenderError, SortKey, Style,
    StyleTokens, SyntheticTree,
};
use dirgram_render::{FnSource, FsSource, TreeSource, capture, render, render_path, render_synthetic};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const EXAMPLE: &str = "mypkg/
    __init__.py
    app.py
    view.py
    test/
        __init__.py
        test_app.py
        test_view.py";

const NO_INIT: &str = "mypkg/
    app.py
    view.py
    test/
        test_app.py
        test_view.py";

const LARGE_EXAMPLE: &str = "MyFakeDir/
├─Vogel.txt
├─monkish.txt
├─jowly.txt
├─scrooge/
│ ├─light.txt
│ ├─reliquary.txt
│ ├─sandal/
│ ├─paycheck/
│ │ ├─electrophoresis.txt
│ │ └─Pyongyang/
│ └─patrimonial/
├─Uganda/
└─pedantic/
  └─cataclysmic.txt";

const DEPTH_LIMIT_1: &str = "MyFakeDir/
├─Vogel.txt
├─monkish.txt
├─jowly.txt
├─scrooge/
├─Uganda/
└─pedantic/";

const ACCESS_DENIED: &str = "MyFakeDir/
├─Vogel.txt
├─monkish.txt
├─jowly.txt
├─scrooge/ [ACCESS DENIED]
├─Uganda/ [ACCESS DENIED]
└─pedantic/ [ACCESS DENIED]";

fn large() -> (SyntheticTree, NodeId) {
    dirgram_parse::parse(LARGE_EXAMPLE).unwrap()
}

fn draw(config: &RenderConfig) -> String {
    let (tree, root) = large();
    render_synthetic(&tree, root, config).unwrap()
}

fn letters() -> (SyntheticTree, NodeId) {
    let mut tree = SyntheticTree::new();
    let root = tree.new_root(NodeKind::Container, "example");
    tree.create_containers(root, ["a", "b", "c", "d"]).unwrap();
    tree.create_leaves(root, ["e", "f", "g", "h"]).unwrap();
    (tree, root)
}

/// Source whose listings fail for every container below the root.
fn error_raising(tree: &SyntheticTree) -> impl TreeSource<Node = NodeId> + '_ {
    FnSource::new(
        move |n: &NodeId| tree.name(*n).to_string(),
        move |n: &NodeId| tree.kind(*n) == Some(NodeKind::Container),
        move |n: &NodeId| match tree.depth(*n) {
            Some(0) => Ok(tree.children(*n).to_vec()),
            _ => Err(ListError::new(
                tree.path(*n),
                ListErrorKind::Other,
                "Oops!!!",
            )),
        },
    )
}

#[test]
fn test_default_render_matches_parsed_input() {
    assert_eq!(draw(&RenderConfig::default()), LARGE_EXAMPLE);
}

#[test]
fn test_item_limit_zero_without_beyond() {
    let config = RenderConfig {
        item_limit: ItemLimit::Total(0),
        ..Default::default()
    };
    assert_eq!(draw(&config), "MyFakeDir/");
}

#[test]
fn test_depth_limit_zero_without_beyond() {
    let config = RenderConfig {
        depth_limit: Some(0),
        ..Default::default()
    };
    assert_eq!(draw(&config), "MyFakeDir/");
}

#[test]
fn test_limits_zero_with_beyond_counts() {
    let expected = "MyFakeDir/\n└─3 folder(s), 3 file(s)";
    let config = RenderConfig {
        item_limit: ItemLimit::Total(0),
        beyond: Some(Beyond::Counts),
        ..Default::default()
    };
    assert_eq!(draw(&config), expected);

    let config = RenderConfig {
        depth_limit: Some(0),
        beyond: Some(Beyond::Counts),
        ..Default::default()
    };
    assert_eq!(draw(&config), expected);
}

#[test]
fn test_depth_limit_one() {
    let config = RenderConfig {
        depth_limit: Some(1),
        ..Default::default()
    };
    assert_eq!(draw(&config), DEPTH_LIMIT_1);
}

#[test]
fn test_depth_limit_one_with_beyond_counts() {
    let config = RenderConfig {
        depth_limit: Some(1),
        beyond: Some(Beyond::Counts),
        ..Default::default()
    };
    let expected = "MyFakeDir/
├─Vogel.txt
├─monkish.txt
├─jowly.txt
├─scrooge/
│ └─3 folder(s), 2 file(s)
├─Uganda/
│ └─0 folder(s), 0 file(s)
└─pedantic/
  └─0 folder(s), 1 file(s)";
    assert_eq!(draw(&config), expected);
}

#[test]
fn test_beyond_counts_only_surviving_children() {
    let config = RenderConfig::builder()
        .depth_limit(1usize)
        .beyond(Beyond::Counts)
        .exclude_leaf(r".*\.txt")
        .regex(true)
        .build()
        .unwrap();
    let expected = "MyFakeDir/
├─scrooge/
│ └─3 folder(s), 0 file(s)
├─Uganda/
│ └─0 folder(s), 0 file(s)
└─pedantic/
  └─0 folder(s), 0 file(s)";
    assert_eq!(draw(&config), expected);
}

#[test]
fn test_beyond_ellipsis_and_text() {
    let (tree, root) = letters();
    let config = RenderConfig {
        item_limit: ItemLimit::Total(2),
        beyond: Some(Beyond::Ellipsis),
        ..Default::default()
    };
    assert_eq!(
        render_synthetic(&tree, root, &config).unwrap(),
        "example/\n├─a/\n├─b/\n└─..."
    );

    let config = RenderConfig {
        item_limit: ItemLimit::Total(1),
        beyond: Some(Beyond::Text("and more".into())),
        ..Default::default()
    };
    assert_eq!(
        render_synthetic(&tree, root, &config).unwrap(),
        "example/\n├─a/\n└─and more"
    );
}

#[test]
fn test_no_beyond_line_when_nothing_is_hidden() {
    let (tree, root) = letters();
    let config = RenderConfig {
        item_limit: ItemLimit::Total(8),
        beyond: Some(Beyond::Counts),
        ..Default::default()
    };
    let out = render_synthetic(&tree, root, &config).unwrap();
    assert!(!out.contains("folder(s)"));
    assert!(out.ends_with("└─h"));
}

#[test]
fn test_complex_sort() {
    let config = RenderConfig {
        sort: true,
        sort_reverse: true,
        sort_key: Some(SortKey::new(|name: &str| name.chars().count().to_string())),
        first: Some(FirstKind::Leaves),
        ..Default::default()
    };
    let expected = "MyFakeDir/
├─monkish.txt
├─Vogel.txt
├─jowly.txt
├─pedantic/
│ └─cataclysmic.txt
├─scrooge/
│ ├─reliquary.txt
│ ├─light.txt
│ ├─patrimonial/
│ ├─paycheck/
│ │ ├─electrophoresis.txt
│ │ └─Pyongyang/
│ └─sandal/
└─Uganda/";
    assert_eq!(draw(&config), expected);
}

#[test]
fn test_complex_inclusion() {
    let config = RenderConfig::builder()
        .include_container("sandal")
        .include_container("scrooge")
        .include_container("pedantic")
        .exclude_container("sandal")
        .exclude_leaf("^Vogel")
        .include_leaf("^.[oi]")
        .regex(true)
        .build()
        .unwrap();
    let expected = "MyFakeDir/
├─Vogel.txt
├─monkish.txt
├─jowly.txt
├─scrooge/
│ ├─light.txt
│ └─sandal/
└─pedantic/";
    assert_eq!(draw(&config), expected);
}

#[test]
fn test_literal_filters_need_exact_names() {
    let (tree, root) = dirgram_parse::parse(EXAMPLE).unwrap();
    let config = RenderConfig::builder()
        .include_leaf("app.py")
        .include_leaf("view.py")
        .build()
        .unwrap();
    let out = render_synthetic(&tree, root, &config).unwrap();
    let (reread, reread_root) = dirgram_parse::parse(&out).unwrap();
    assert_eq!(reread.child_names(reread_root), ["app.py", "view.py", "test"]);
}

#[test]
fn test_exclude_files_and_reread() {
    let (tree, root) = dirgram_parse::parse(EXAMPLE).unwrap();
    let config = RenderConfig::builder()
        .exclude_leaf(r".*\..*")
        .regex(true)
        .build()
        .unwrap();
    let out = render_synthetic(&tree, root, &config).unwrap();
    assert_eq!(out, "mypkg/\n└─test/");
}

#[test]
fn test_mask_replaces_filters() {
    let (tree, root) = dirgram_parse::parse(EXAMPLE).unwrap();
    let config = RenderConfig {
        mask: Some(Mask::new(|entry: &Entry<'_>| !entry.name.starts_with('_'))),
        // Ignored while a mask is set.
        exclude_leaves: vec!["app.py".into()],
        tokens: StyleTokens::from_style(Style::Spaces, 4),
        ..Default::default()
    };
    assert_eq!(render_synthetic(&tree, root, &config).unwrap(), NO_INIT);
}

#[test]
fn test_mask_dropping_everything() {
    let config = RenderConfig {
        mask: Some(Mask::new(|_: &Entry<'_>| false)),
        depth_limit: Some(2),
        item_limit: ItemLimit::Total(10),
        ..Default::default()
    };
    assert_eq!(draw(&config).lines().count(), 1);
}

#[test]
fn test_formatter_tokens_do_not_reach_beyond_line() {
    let config = RenderConfig {
        formatter: Some(Formatter::new(|_: &Entry<'_>| {
            Some(ConfigOverride::default().token("split", "->").token("final", "->"))
        })),
        item_limit: ItemLimit::Total(1),
        beyond: Some(Beyond::Counts),
        ..Default::default()
    };
    let expected = "MyFakeDir/\n->Vogel.txt\n└─3 folder(s), 2 file(s)";
    assert_eq!(draw(&config), expected);
}

#[test]
fn test_formatter_without_override() {
    let config = RenderConfig {
        formatter: Some(Formatter::new(|_: &Entry<'_>| None)),
        ..Default::default()
    };
    assert_eq!(draw(&config), LARGE_EXAMPLE);
}

fn expand_scrooge() -> Formatter {
    Formatter::new(|entry: &Entry<'_>| {
        (entry.name == "scrooge").then(|| ConfigOverride {
            depth_limit: Some(None),
            ..Default::default()
        })
    })
}

#[test]
fn test_sticky_formatter_expands_whole_subtree() {
    let config = RenderConfig {
        formatter: Some(expand_scrooge()),
        depth_limit: Some(1),
        sticky_formatter: true,
        ..Default::default()
    };
    let expected = "MyFakeDir/
├─Vogel.txt
├─monkish.txt
├─jowly.txt
├─scrooge/
│ ├─light.txt
│ ├─reliquary.txt
│ ├─sandal/
│ ├─paycheck/
│ │ ├─electrophoresis.txt
│ │ └─Pyongyang/
│ └─patrimonial/
├─Uganda/
└─pedantic/";
    assert_eq!(draw(&config), expected);
}

#[test]
fn test_plain_formatter_expands_one_level() {
    let config = RenderConfig {
        formatter: Some(expand_scrooge()),
        depth_limit: Some(1),
        ..Default::default()
    };
    let expected = "MyFakeDir/
├─Vogel.txt
├─monkish.txt
├─jowly.txt
├─scrooge/
│ ├─light.txt
│ ├─reliquary.txt
│ ├─sandal/
│ ├─paycheck/
│ └─patrimonial/
├─Uganda/
└─pedantic/";
    assert_eq!(draw(&config), expected);
}

#[test]
fn test_formatter_sets_mask_per_depth() {
    let config = RenderConfig {
        formatter: Some(Formatter::new(|entry: &Entry<'_>| {
            let mask = if entry.depth == 0 {
                Mask::new(|e: &Entry<'_>| !e.name.ends_with(".txt"))
            } else {
                Mask::new(|e: &Entry<'_>| e.name.ends_with(".txt"))
            };
            Some(ConfigOverride {
                mask: Some(Some(mask)),
                ..Default::default()
            })
        })),
        ..Default::default()
    };
    let expected = "MyFakeDir/
├─scrooge/
│ ├─light.txt
│ └─reliquary.txt
├─Uganda/
└─pedantic/
  └─cataclysmic.txt";
    assert_eq!(draw(&config), expected);
}

#[test]
fn test_formatter_with_unknown_token_fails() {
    let config = RenderConfig {
        formatter: Some(Formatter::new(|_: &Entry<'_>| {
            Some(ConfigOverride::default().token("bogus", "x"))
        })),
        ..Default::default()
    };
    let (tree, root) = large();
    assert!(matches!(
        render_synthetic(&tree, root, &config),
        Err(RenderError::Config(ConfigError::UnknownToken(_)))
    ));
}

#[test]
fn test_invalid_regex_fails_before_drawing() {
    let config = RenderConfig {
        exclude_leaves: vec!["(".into()],
        regex: true,
        ..Default::default()
    };
    let (tree, root) = large();
    assert!(matches!(
        render_synthetic(&tree, root, &config),
        Err(RenderError::Config(ConfigError::InvalidPattern { .. }))
    ));
}

#[test]
fn test_tolerated_listing_errors_are_tagged() {
    let (tree, root) = large();
    let source = error_raising(&tree);

    let config = RenderConfig {
        acceptable_errors: HashSet::from([ListErrorKind::Other]),
        ..Default::default()
    };
    assert_eq!(render(&source, &root, &config).unwrap(), ACCESS_DENIED);

    let config = RenderConfig {
        acceptable_errors: HashSet::from([ListErrorKind::Other, ListErrorKind::PermissionDenied]),
        ..Default::default()
    };
    assert_eq!(render(&source, &root, &config).unwrap(), ACCESS_DENIED);
}

#[test]
fn test_custom_denied_tag() {
    let (tree, root) = large();
    let config = RenderConfig {
        acceptable_errors: HashSet::from([ListErrorKind::Other]),
        denied_tag: "<- BUMMER!".into(),
        ..Default::default()
    };
    let expected = "MyFakeDir/
├─Vogel.txt
├─monkish.txt
├─jowly.txt
├─scrooge/<- BUMMER!
├─Uganda/<- BUMMER!
└─pedantic/<- BUMMER!";
    assert_eq!(render(&error_raising(&tree), &root, &config).unwrap(), expected);
}

#[test]
fn test_untolerated_listing_errors_abort() {
    let (tree, root) = large();
    let source = error_raising(&tree);

    // Default tolerates only permission errors.
    let err = render(&source, &root, &RenderConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::Listing(ref e) if e.kind == ListErrorKind::Other));

    let config = RenderConfig {
        acceptable_errors: HashSet::new(),
        ..Default::default()
    };
    assert!(render(&source, &root, &config).is_err());
}

#[test]
fn test_containers_past_depth_limit_are_not_listed() {
    let (tree, root) = large();
    let config = RenderConfig {
        depth_limit: Some(1),
        acceptable_errors: HashSet::new(),
        ..Default::default()
    };
    assert_eq!(
        render(&error_raising(&tree), &root, &config).unwrap(),
        DEPTH_LIMIT_1
    );

    // With a beyond line the counts are needed, so the failure surfaces.
    let config = RenderConfig {
        beyond: Some(Beyond::Ellipsis),
        ..config
    };
    assert!(render(&error_raising(&tree), &root, &config).is_err());
}

#[test]
fn test_depth_limit_zero_skips_failing_root() {
    let mut tree = SyntheticTree::new();
    let root = tree.new_root(NodeKind::Container, "root");
    tree.create_leaf(root, "a.txt").unwrap();
    let source = FnSource::new(
        |n: &NodeId| tree.name(*n).to_string(),
        |n: &NodeId| tree.kind(*n) == Some(NodeKind::Container),
        |n: &NodeId| {
            Err(ListError::new(
                tree.path(*n),
                ListErrorKind::PermissionDenied,
                "denied",
            ))
        },
    );

    let config = RenderConfig {
        depth_limit: Some(0),
        ..Default::default()
    };
    assert_eq!(render(&source, &root, &config).unwrap(), "root/");
    assert_eq!(
        render(&source, &root, &RenderConfig::default()).unwrap(),
        "root/ [ACCESS DENIED]"
    );
}

#[test]
fn test_per_kind_limits_on_letters() {
    let (tree, root) = letters();
    let cases = [
        ((Some(2), Some(2)), "example/\n├─a/\n├─b/\n├─e\n└─f"),
        ((Some(2), None), "example/\n├─a/\n├─b/\n├─e\n├─f\n├─g\n└─h"),
        ((None, Some(0)), "example/\n├─a/\n├─b/\n├─c/\n└─d/"),
        ((Some(0), Some(0)), "example/"),
    ];
    for ((containers, leaves), expected) in cases {
        let config = RenderConfig {
            item_limit: ItemLimit::PerKind { containers, leaves },
            sort: true,
            ..Default::default()
        };
        assert_eq!(render_synthetic(&tree, root, &config).unwrap(), expected);
    }
}

#[test]
fn test_per_kind_unlimited_matches_default() {
    let config = RenderConfig {
        item_limit: ItemLimit::PerKind {
            containers: None,
            leaves: None,
        },
        ..Default::default()
    };
    assert_eq!(draw(&config), LARGE_EXAMPLE);
}

#[test]
fn test_per_kind_leaves_only() {
    let config = RenderConfig {
        item_limit: ItemLimit::PerKind {
            containers: Some(0),
            leaves: None,
        },
        ..Default::default()
    };
    let out = draw(&config);
    assert!(out.lines().skip(1).all(|line| line.ends_with("txt")));
}

#[test]
fn test_per_kind_caps_every_container() {
    let config = RenderConfig {
        item_limit: ItemLimit::PerKind {
            containers: None,
            leaves: Some(1),
        },
        first: Some(FirstKind::Leaves),
        ..Default::default()
    };
    let (rendered, root) = dirgram_parse::parse(&draw(&config)).unwrap();
    for id in rendered.descendants(root) {
        let (_, leaves) = rendered.count_kinds(rendered.children(id));
        assert!(leaves <= 1);
    }
}

#[test]
fn test_custom_tokens() {
    let (tree, root) = dirgram_parse::parse(EXAMPLE).unwrap();
    let mut tokens = StyleTokens::default();
    for (key, value) in [
        ("space", ">>"),
        ("split", ">>"),
        ("extend", "II"),
        ("final", "->"),
        ("folderstart", "Folder: "),
        ("filestart", "File: "),
    ] {
        tokens.set(key, value).unwrap();
    }
    let config = RenderConfig {
        tokens,
        depth_limit: Some(1),
        item_limit: ItemLimit::Total(5),
        ..Default::default()
    };
    let expected = "Folder: mypkg/
>>File: __init__.py
>>File: app.py
>>File: view.py
->Folder: test/";
    assert_eq!(render_synthetic(&tree, root, &config).unwrap(), expected);
}

#[test]
fn test_indent_scaling() {
    let (tree, root) = dirgram_parse::parse(EXAMPLE).unwrap();

    let config = RenderConfig::with_style(Style::Dash, 4);
    let expected = "mypkg/
|---__init__.py
|---app.py
|---view.py
|---test/
    |---__init__.py
    |---test_app.py
    |---test_view.py";
    assert_eq!(render_synthetic(&tree, root, &config).unwrap(), expected);

    let config = RenderConfig::with_style(Style::Lines, 1);
    let expected = "mypkg/
├__init__.py
├app.py
├view.py
└test/
 ├__init__.py
 ├test_app.py
 └test_view.py";
    assert_eq!(render_synthetic(&tree, root, &config).unwrap(), expected);
}

#[test]
fn test_every_style_parses_back() {
    use strum::IntoEnumIterator;

    let (tree, root) = large();
    for style in Style::iter() {
        let config = RenderConfig::with_style(style, 2);
        let out = render_synthetic(&tree, root, &config).unwrap();
        if style == Style::Emoji {
            assert!(out.starts_with("📁 MyFakeDir/"));
            continue;
        }
        let (reread, reread_root) = dirgram_parse::parse(&out).unwrap();
        let plain = render_synthetic(&reread, reread_root, &RenderConfig::default()).unwrap();
        assert_eq!(plain, LARGE_EXAMPLE, "style {style}");
    }
}

#[test]
fn test_render_real_directory() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("b.txt"), b"").unwrap();
    fs::write(temp.path().join("a.txt"), b"").unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    fs::write(temp.path().join("sub").join("c.txt"), b"").unwrap();

    let config = RenderConfig {
        sort: true,
        ..Default::default()
    };
    let out = render_path(temp.path(), &config).unwrap();
    let lines: Vec<&str> = out.lines().skip(1).collect();
    assert_eq!(lines, ["├─a.txt", "├─b.txt", "└─sub/", "  └─c.txt"]);
}

#[test]
fn test_render_missing_path_as_leaf() {
    let temp = TempDir::new().unwrap();
    let config = RenderConfig::default();
    let missing = temp.path().join("missing");
    assert_eq!(render_path(&missing, &config).unwrap(), "missing");
}

#[test]
fn test_capture_real_directory_matches_render() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("one").join("two")).unwrap();
    fs::write(temp.path().join("one").join("x.txt"), b"").unwrap();
    fs::write(temp.path().join("top.txt"), b"").unwrap();

    let config = RenderConfig {
        sort: true,
        first: Some(FirstKind::Containers),
        ..Default::default()
    };
    let root = temp.path().to_path_buf();
    let (tree, tree_root) = capture(&FsSource::new(), &root, &config).unwrap();

    assert_eq!(tree.child_names(tree_root), ["one", "top.txt"]);
    assert_eq!(
        render_synthetic(&tree, tree_root, &RenderConfig::default()).unwrap(),
        render_path(temp.path(), &config).unwrap()
    );
}

#[test]
fn test_capture_honors_filters_and_depth() {
    let (tree, root) = large();
    let config = RenderConfig::builder()
        .depth_limit(1usize)
        .exclude_leaf("Vogel.txt")
        .build()
        .unwrap();
    let source = dirgram_render::SyntheticSource::new(&tree);
    let (copy, copy_root) = capture(&source, &root, &config).unwrap();
    assert_eq!(
        copy.child_names(copy_root),
        ["monkish.txt", "jowly.txt", "scrooge", "Uganda", "pedantic"]
    );
    let scrooge = copy.lookup(copy_root, "scrooge").unwrap();
    assert!(copy.children(scrooge).is_empty());
}

#[test]
fn test_capture_tolerated_errors_leave_containers_empty() {
    let (tree, root) = large();
    let config = RenderConfig {
        acceptable_errors: HashSet::from([ListErrorKind::Other]),
        ..Default::default()
    };
    let (copy, copy_root) = capture(&error_raising(&tree), &root, &config).unwrap();
    assert_eq!(copy.len(), 7);
    assert_eq!(
        render_synthetic(&copy, copy_root, &RenderConfig::default()).unwrap(),
        DEPTH_LIMIT_1
    );
}
