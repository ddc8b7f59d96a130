//! Binding rules for links and forms

use ajax_links::{AjaxLinks, SettingsOverrides};
use ajax_links_testkit::fixtures::{content_page, link, response_page, PAGE_URL};
use ajax_links_testkit::{init_test_logging, MemoryHost};

fn setup(html: &str, overrides: SettingsOverrides) -> (MemoryHost, AjaxLinks<MemoryHost>) {
    init_test_logging();
    let host = MemoryHost::new(html, PAGE_URL);
    let root = host.dom().first("[data-bsp-ajax-links]");
    let links = AjaxLinks::init(root, overrides, host.clone());
    (host, links)
}

#[test]
fn elements_without_href_or_action_are_skipped() {
    let page = content_page(&format!(
        r#"{}<a data-ajax-link-target=".content">no href</a><a href="" data-ajax-link-target=".content">empty</a><div data-ajax-link-target=".content">div</div><form data-ajax-link-target=".content"></form>"#,
        link("/ok", ".content", "ok")
    ));
    let (host, links) = setup(&page, SettingsOverrides::default());

    assert_eq!(links.bound_count(), 1);
    assert_eq!(host.dom().total_listeners(), 1);

    let skipped = host.dom().select("div[data-ajax-link-target]")[0];
    assert!(!host.dom().click(skipped));
    assert!(host.fetch().requests().is_empty());
}

#[test]
fn activation_is_idempotent() {
    let (host, links) = setup(
        &content_page(&link("/page2", ".content", "Next")),
        SettingsOverrides::default(),
    );
    let anchor = host.dom().first("a");

    links.activate(&[links.root()]);
    links.activate(&[anchor]);

    assert_eq!(host.dom().listener_count(anchor), 1);
    host.fetch().respond("/page2", &response_page("two"));
    host.dom().click(anchor);
    host.run_until_stalled();
    assert_eq!(host.fetch().requests(), vec!["/page2"]);
}

#[test]
fn href_and_target_are_read_at_click_time() {
    let (host, _links) = setup(
        &content_page(&link("/page2", ".content", "Next")),
        SettingsOverrides::default(),
    );
    host.fetch().respond("/changed", &response_page("changed"));
    let anchor = host.dom().first("a");

    host.dom().set_attribute(anchor, "href", "/changed");
    host.dom().click(anchor);
    host.run_until_stalled();
    assert_eq!(host.fetch().requests(), vec!["/changed"]);
    assert_eq!(host.dom().text(host.dom().first(".content")), "changed");
}

#[test]
fn removed_target_attribute_falls_back_to_navigation() {
    let (host, _links) = setup(
        &content_page(&link("/page2", ".content", "Next")),
        SettingsOverrides::default(),
    );
    let anchor = host.dom().first("a");

    host.dom().remove_attribute(anchor, "data-ajax-link-target");
    host.dom().click(anchor);
    host.run_until_stalled();

    assert_eq!(host.location().assigned(), vec!["/page2"]);
    assert!(host.fetch().requests().is_empty());
}

#[test]
fn forms_merge_fields_over_action_params() {
    let page = r#"<div data-bsp-ajax-links>
        <form action="/search?sort=asc&q=old" data-ajax-link-target=".results">
            <input name="q" value="rust lang">
            <input type="checkbox" name="fresh" value="1">
            <input type="submit" name="go" value="Go">
        </form>
        <div class="results"></div>
    </div>"#;
    let (host, links) = setup(page, SettingsOverrides::default());
    host.fetch().respond(
        "/search?sort=asc&q=rust+lang",
        r#"<div class="results"><p>hit</p></div>"#,
    );
    let form = host.dom().first("form");

    assert!(links.is_bound(form));
    assert!(host.dom().submit(form));
    assert!(!host.dom().click(form), "forms bind submit only");
    host.run_until_stalled();

    assert_eq!(host.fetch().requests(), vec!["/search?sort=asc&q=rust+lang"]);
    assert_eq!(host.dom().inner_html(host.dom().first(".results")), "<p>hit</p>");
}

#[test]
fn form_action_without_fields_still_gets_query_marker() {
    let page = r#"<div data-bsp-ajax-links><form action="/list" data-ajax-link-target=".out"></form><div class="out"></div></div>"#;
    let (host, _links) = setup(page, SettingsOverrides::default());

    host.dom().submit(host.dom().first("form"));
    host.run_until_stalled();

    assert_eq!(host.fetch().requests(), vec!["/list?"]);
}

#[test]
fn relative_action_without_query_adds_no_params() {
    let page = r#"<div data-bsp-ajax-links><form action="results" data-ajax-link-target=".out"><input name="q" value="x"></form><div class="out"></div></div>"#;
    let (host, _links) = setup(page, SettingsOverrides::default());
    host.fetch().respond("results?q=x", r#"<div class="out">hits</div>"#);

    host.dom().submit(host.dom().first("form"));
    host.run_until_stalled();

    assert_eq!(host.fetch().requests(), vec!["results?q=x"]);
    assert_eq!(host.dom().text(host.dom().first(".out")), "hits");
}

#[test]
fn instances_do_not_share_bindings() {
    let page = r#"<body>
        <div id="left" data-bsp-ajax-links><div class="l"></div><a id="la" href="/left" data-ajax-link-target=".l">L</a></div>
        <div id="right" data-bsp-ajax-links><div class="r"></div><a id="ra" href="/right" data-ajax-link-target=".r">R</a></div>
    </body>"#;
    init_test_logging();
    let host = MemoryHost::new(page, PAGE_URL);
    let left = AjaxLinks::init(
        host.dom().first("#left"),
        SettingsOverrides::default().with_extra_param("side", "left"),
        host.clone(),
    );
    let right = AjaxLinks::init(
        host.dom().first("#right"),
        SettingsOverrides::default().with_full_page_ajax(false),
        host.clone(),
    );
    let la = host.dom().first("#la");
    let ra = host.dom().first("#ra");

    assert!(left.is_bound(la) && !left.is_bound(ra));
    assert!(right.is_bound(ra) && !right.is_bound(la));
    assert_eq!(host.dom().listener_count(la), 1);
    assert_eq!(host.dom().listener_count(ra), 1);

    host.fetch()
        .respond("/left?side=left", r#"<div class="l">left</div>"#)
        .respond("/right", "right");
    host.dom().click(la);
    host.dom().click(ra);
    host.run_until_stalled();

    assert_eq!(host.dom().inner_html(host.dom().first(".l")), "left");
    assert_eq!(host.dom().inner_html(host.dom().first(".r")), "right");
}

#[test]
fn dropped_instance_stops_intercepting() {
    let (host, links) = setup(
        &content_page(&link("/page2", ".content", "Next")),
        SettingsOverrides::default(),
    );
    let anchor = host.dom().first("a");
    drop(links);

    host.dom().click(anchor);
    host.run_until_stalled();

    assert!(host.fetch().requests().is_empty());
    assert!(host.location().assigned().is_empty());
}
