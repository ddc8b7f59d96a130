//! Page builders shared by integration tests

/// Page URL used by fixtures
pub const PAGE_URL: &str = "/page1.html";

/// Root wrapper with a `.content` target holding `inner`
pub fn content_page(inner: &str) -> String {
    format!(
        r#"<html><body><div class="content-wrap" data-bsp-ajax-links><div class="content">{inner}</div></div></body></html>"#
    )
}

/// Link targeting `target`
pub fn link(href: &str, target: &str, text: &str) -> String {
    format!(r#"<a href="{href}" data-ajax-link-target="{target}">{text}</a>"#)
}

/// Load-more affordance targeting `target`
pub fn load_more(href: &str, target: &str) -> String {
    format!(r#"<a class="load-more" href="{href}" data-ajax-link-target="{target}">More</a>"#)
}

/// Full response page whose `.content` holds `inner`
pub fn response_page(inner: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>next</title></head><body><header>nav</header><div class="content">{inner}</div></body></html>"#
    )
}
