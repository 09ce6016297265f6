//! Profile page scraping
//!
//! Pulls a handful of attributes out of the public profile page using the
//! `<title>` element and OpenGraph `<meta>` tags. Layout changes on the remote
//! side degrade to empty fields, never to errors.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::ProfileDetails;

/// Any `<meta ...>` tag.
static META_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").ok());

/// A single `name="value"` or `name='value'` attribute.
static ATTRIBUTE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).ok()
});

static TITLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok());

/// Scrape profile attributes from an HTML document.
pub fn extract_profile(id: u64, html: &str) -> ProfileDetails {
    ProfileDetails {
        id,
        title: extract_title(html),
        display_name: meta_content(html, &["og:title"]),
        description: meta_content(html, &["og:description", "description"]),
        avatar_url: meta_content(html, &["og:image"]),
    }
}

fn extract_title(html: &str) -> Option<String> {
    if let Some(re) = TITLE.as_ref()
        && let Some(caps) = re.captures(html)
        && let Some(m) = caps.get(1)
    {
        return non_empty(decode_entities(m.as_str()));
    }
    None
}

/// Return the `content` of the first meta tag whose `property` or `name`
/// matches one of `keys`, trying keys in order.
fn meta_content(html: &str, keys: &[&str]) -> Option<String> {
    let (Some(meta_re), Some(attr_re)) = (META_TAG.as_ref(), ATTRIBUTE.as_ref()) else {
        return None;
    };

    let tags: Vec<(Option<String>, Option<String>)> = meta_re
        .find_iter(html)
        .map(|tag| {
            let mut key = None;
            let mut content = None;
            for caps in attr_re.captures_iter(tag.as_str()) {
                let Some(name) = caps.get(1) else { continue };
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str().to_string());
                match name.as_str().to_ascii_lowercase().as_str() {
                    "property" | "name" => key = value.map(|v| v.to_ascii_lowercase()),
                    "content" => content = value,
                    _ => {}
                }
            }
            (key, content)
        })
        .collect();

    keys.iter().find_map(|wanted| {
        tags.iter()
            .find(|(key, _)| key.as_deref() == Some(*wanted))
            .and_then(|(_, content)| content.as_deref())
            .and_then(|c| non_empty(decode_entities(c)))
    })
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Decode the handful of entities that show up in titles and descriptions.
fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
