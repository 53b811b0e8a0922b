use suvi_forge::listing::{resolve, ListingRules};
use suvi_forge::ForgeError;
use url::Url;

fn base(url: &str) -> Url {
    Url::parse(url).unwrap()
}

fn as_strings(urls: &[suvi_forge::contract::FrameUrl]) -> Vec<&str> {
    urls.iter().map(|u| u.as_str()).collect()
}

#[test]
fn test_resolve_drops_alias_and_joins_against_base() {
    let html = r#"<a href="a.png">a</a> <a href="b.png">b</a> <a href="latest.png">latest</a>"#;

    let urls = resolve(html, &base("https://x/dir/"), &ListingRules::default()).unwrap();

    assert_eq!(
        as_strings(&urls),
        vec!["https://x/dir/a.png", "https://x/dir/b.png"]
    );
}

#[test]
fn test_resolve_sorts_and_deduplicates_regardless_of_discovery_order() {
    let html = r#"
        <a href="or_suvi-l2-ci284_g18_s20250101T001200Z.png">3</a>
        <a href="or_suvi-l2-ci284_g18_s20250101T000000Z.png">1</a>
        <a href="latest.png">alias</a>
        <a href="or_suvi-l2-ci284_g18_s20250101T000400Z.png">2</a>
        <a href="or_suvi-l2-ci284_g18_s20250101T000000Z.png">1 again</a>
    "#;

    let urls = resolve(html, &base("https://x/dir/"), &ListingRules::default()).unwrap();

    assert_eq!(urls.len(), 3, "three distinct frames, alias excluded");
    let mut sorted = urls.clone();
    sorted.sort();
    assert_eq!(urls, sorted, "result must be in ascending string order");
    assert!(urls[0].as_str().ends_with("T000000Z.png"));
    assert!(urls[2].as_str().ends_with("T001200Z.png"));
}

#[test]
fn test_resolve_matches_extension_case_insensitively() {
    let html = r#"<A HREF="UPPER.PNG">x</A> <a href="lower.png">y</a> <a href="notes.txt">z</a>"#;

    let urls = resolve(html, &base("https://x/dir/"), &ListingRules::default()).unwrap();

    assert_eq!(
        as_strings(&urls),
        vec!["https://x/dir/UPPER.PNG", "https://x/dir/lower.png"]
    );
}

#[test]
fn test_resolve_handles_absolute_and_parent_relative_hrefs() {
    let html = r#"
        <a href="https://cdn.example/frames/abs.png">abs</a>
        <a href="../up.png">up</a>
        <a href="/root.png">root</a>
    "#;

    let urls = resolve(html, &base("https://x/a/dir/"), &ListingRules::default()).unwrap();

    assert_eq!(
        as_strings(&urls),
        vec![
            "https://cdn.example/frames/abs.png",
            "https://x/a/up.png",
            "https://x/root.png",
        ]
    );
}

#[test]
fn test_resolve_only_drops_exact_alias_segment() {
    let html = r#"<a href="notlatest.png">keep</a> <a href="sub/latest.png">drop</a>"#;

    let urls = resolve(html, &base("https://x/dir/"), &ListingRules::default()).unwrap();

    assert_eq!(as_strings(&urls), vec!["https://x/dir/notlatest.png"]);
}

#[test]
fn test_resolve_with_custom_rules() {
    let html = r#"<a href="f1.jpg">1</a> <a href="f2.png">2</a> <a href="newest.jpg">n</a>"#;
    let rules = ListingRules::new("jpg", "newest.jpg");

    let urls = resolve(html, &base("https://x/dir/"), &rules).unwrap();

    assert_eq!(as_strings(&urls), vec!["https://x/dir/f1.jpg"]);
}

#[test]
fn test_resolve_empty_listing_fails() {
    struct TestCase {
        name: &'static str,
        html: &'static str,
    }

    let cases = vec![
        TestCase {
            name: "no links at all",
            html: "<html><body>Index of /</body></html>",
        },
        TestCase {
            name: "only other extensions",
            html: r#"<a href="a.jpg">a</a> <a href="b.txt">b</a>"#,
        },
        TestCase {
            name: "only the alias entry",
            html: r#"<a href="latest.png">latest</a>"#,
        },
    ];

    for tc in cases {
        let result = resolve(tc.html, &base("https://x/dir/"), &ListingRules::default());
        match result {
            Err(ForgeError::EmptyListing { base_url }) => {
                assert_eq!(base_url, "https://x/dir/", "{}", tc.name)
            }
            other => panic!("{}: expected EmptyListing, got {:?}", tc.name, other),
        }
    }
}
