use std::path::Path;

const DESCRIPTION_PREFIXES: [&str; 2] = ["Rockfax Description", "UKClimbing Description"];

// Named entities found in the descriptions. `&amp;` goes last so that an
// escaped entity such as `&amp;lt;` is only decoded once.
const NAMED_ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// Joins the slug of a climb to the URL of its crag. An absolute URL is
/// returned as is.
pub fn join_url(base: &str, slug: &str) -> String {
    if slug.starts_with("http://") || slug.starts_with("https://") {
        return slug.to_string();
    }
    let slug = slug.trim_start_matches('/');
    if base.ends_with('/') {
        format!("{}{}", base, slug)
    } else {
        format!("{}/{}", base, slug)
    }
}

/// Resolves a path of the configuration file against the directory of that file.
pub fn resolve_path(root: &Path, path: &str) -> String {
    root.join(path).display().to_string()
}

/// The text of a climb description: markup dropped, entities decoded, source
/// heading removed.
pub fn clean_description(desc: &str) -> String {
    let text = decode_entities(&strip_tags(desc));
    let text = text.trim();
    let text = DESCRIPTION_PREFIXES
        .iter()
        .find_map(|p| text.strip_prefix(p))
        .unwrap_or(text);
    text.trim().to_string()
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Decodes the numeric character references (`&#39;`, `&#x27;`) and the
/// common named entities.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("&#") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';').and_then(|end| {
            numeric_reference(&tail[2..end]).map(|ch| (ch, end))
        }) {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push_str("&#");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    NAMED_ENTITIES
        .iter()
        .fold(out, |acc, (entity, text)| acc.replace(entity, text))
}

fn numeric_reference(code: &str) -> Option<char> {
    let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse::<u32>().ok()?,
    };
    char::from_u32(value)
}
