//! History bridge: navigations go through history and traversal re-fetches

use ajax_links::effects::DomEffects;
use ajax_links::{AjaxLinks, HistoryEntry, LoadType, SettingsOverrides};
use ajax_links_testkit::fixtures::{content_page, link, load_more, response_page, PAGE_URL};
use ajax_links_testkit::{init_test_logging, HistoryOp, MemoryHost};

fn setup(html: &str, overrides: SettingsOverrides) -> (MemoryHost, AjaxLinks<MemoryHost>) {
    init_test_logging();
    let host = MemoryHost::new(html, PAGE_URL);
    let root = host.dom().first("[data-bsp-ajax-links]");
    let links = AjaxLinks::init(root, overrides.with_history_replace(true), host.clone());
    (host, links)
}

#[test]
fn first_click_synthesizes_home_entry_then_pushes() {
    let (host, _links) = setup(
        &content_page(&link("/page2", ".content", "Next")),
        SettingsOverrides::default(),
    );
    host.fetch().respond("/page2", &response_page("two"));
    let anchor = host.dom().first("a");
    assert_eq!(host.history().subscriber_count(), 1);
    assert!(host.history().ops().is_empty(), "nothing is written before a click");

    host.dom().click(anchor);
    host.run_until_stalled();

    assert_eq!(
        host.history().ops(),
        vec![
            HistoryOp::Replace(HistoryEntry {
                target: ".content".to_string(),
                url: PAGE_URL.to_string(),
                originating_element: None,
            }),
            HistoryOp::Push(HistoryEntry {
                target: ".content".to_string(),
                url: "/page2".to_string(),
                originating_element: Some(anchor),
            }),
        ]
    );
    assert_eq!(host.fetch().requests(), vec!["/page2"]);
    assert_eq!(host.dom().text(host.dom().first(".content")), "two");
}

#[test]
fn traversal_refetches_entry_urls() {
    let (host, _links) = setup(
        &content_page(&link("/page2", ".content", "Next")),
        SettingsOverrides::default(),
    );
    host.fetch()
        .respond("/page2", &response_page(&link("/page3", ".content", "Third")))
        .respond("/page3", &response_page("three"))
        .respond(PAGE_URL, &response_page(&link("/page2", ".content", "Next")));
    let target = host.dom().first(".content");

    host.dom().click(host.dom().first("a"));
    host.run_until_stalled();
    host.dom().click(host.dom().first("a[href=\"/page3\"]"));
    host.run_until_stalled();
    assert_eq!(host.dom().text(target), "three");

    assert!(host.history().back());
    host.run_until_stalled();
    assert_eq!(host.dom().text(target), "Third");

    assert!(host.history().back());
    host.run_until_stalled();
    assert_eq!(host.dom().text(target), "Next");

    assert!(host.history().forward());
    host.run_until_stalled();

    assert_eq!(
        host.fetch().requests(),
        vec!["/page2", "/page3", "/page2", PAGE_URL, "/page2"]
    );
    let replaces = host
        .history()
        .ops()
        .into_iter()
        .filter(|op| matches!(op, HistoryOp::Replace(_)))
        .count();
    assert_eq!(replaces, 1, "home entry is synthesized once");
}

#[test]
fn restored_home_content_is_interactive() {
    let (host, _links) = setup(
        &content_page(&link("/page2", ".content", "Next")),
        SettingsOverrides::default(),
    );
    host.fetch()
        .respond("/page2", &response_page("two"))
        .respond(PAGE_URL, &response_page(&link("/page2", ".content", "Next")));

    host.dom().click(host.dom().first("a"));
    host.run_until_stalled();
    host.history().back();
    host.run_until_stalled();

    let restored = host.dom().first("a");
    assert_eq!(host.dom().listener_count(restored), 1);
    host.dom().click(restored);
    host.run_until_stalled();
    assert_eq!(host.dom().text(host.dom().first(".content")), "two");
}

#[test]
fn form_entries_carry_no_origin() {
    let page = r#"<div data-bsp-ajax-links><form action="/find" data-ajax-link-target=".out"><input name="q" value="x"></form><div class="out"></div></div>"#;
    let (host, _links) = setup(page, SettingsOverrides::default());
    host.fetch().respond("/find?q=x", r#"<div class="out">found</div>"#);

    host.dom().submit(host.dom().first("form"));
    host.run_until_stalled();

    let pushed = host.history().ops().into_iter().find_map(|op| match op {
        HistoryOp::Push(entry) => Some(entry),
        HistoryOp::Replace(_) => None,
    });
    assert_eq!(
        pushed,
        Some(HistoryEntry {
            target: ".out".to_string(),
            url: "/find?q=x".to_string(),
            originating_element: None,
        })
    );
    assert_eq!(host.dom().text(host.dom().first(".out")), "found");
}

#[test]
fn load_more_origin_travels_through_history() {
    let page = content_page(&format!("<p>1</p>{}", load_more("/more", ".content")));
    let (host, _links) = setup(
        &page,
        SettingsOverrides::default().with_load_type(LoadType::LoadMore),
    );
    host.fetch().respond("/more", &response_page("<p>2</p>"));
    let more = host.dom().first(".load-more");

    host.dom().click(more);
    assert!(!host.dom().is_connected(more));
    host.run_until_stalled();

    assert_eq!(host.dom().text(host.dom().first(".content")), "12");
}
