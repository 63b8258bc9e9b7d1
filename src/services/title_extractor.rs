//! Derives a readable title from a link.
//!
//! `https://blog.example.com/posts/my-first_post.html` becomes `My First Post`;
//! a bare host becomes the host name.

use reqwest::Url;

pub fn extract_title(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return url.to_string(),
    };

    if let Some(segment) = parsed.path().split('/').filter(|s| !s.is_empty()).last() {
        return title_from_segment(segment);
    }

    parsed.host_str().unwrap_or_default().to_string()
}

fn title_from_segment(segment: &str) -> String {
    let spaced = segment.replace(['-', '_'], " ");
    strip_extension(&spaced)
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

// Only a final `.ext` with no further dots or slashes is removed.
fn strip_extension(s: &str) -> &str {
    match s.rfind('.') {
        Some(idx) if idx + 1 < s.len() => &s[..idx],
        _ => s,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
