//! `Link` header parsing (RFC 8288).
//!
//! Mastodon paginates with `Link: <https://host/api/v1/timelines/home?max_id=9>; rel="next"`.
//! The cursor is the full URI, fetched as-is for the next page.

use entity_store::PageInfo;

/// `next` and `prev` relations of one header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRelations {
    pub next: Option<String>,
    pub prev: Option<String>,
}

pub fn parse_link_header(header: &str) -> LinkRelations {
    let mut relations = LinkRelations::default();
    for part in link_values(header) {
        let Some((target, params)) = part.trim().strip_prefix('<').and_then(|p| p.split_once('>'))
        else {
            continue;
        };
        let target = target.trim();
        if target.is_empty() {
            continue;
        }
        for param in params.split(';') {
            let Some(rel) = param.trim().strip_prefix("rel=") else {
                continue;
            };
            for name in rel.trim_matches('"').split_whitespace() {
                let slot = match name.to_ascii_lowercase().as_str() {
                    "next" => &mut relations.next,
                    "prev" | "previous" => &mut relations.prev,
                    _ => continue,
                };
                slot.get_or_insert_with(|| target.to_string());
            }
        }
    }
    relations
}

/// Split a header into its comma-separated link values. Commas inside a
/// `<target>` or a quoted parameter belong to the value.
fn link_values(header: &str) -> Vec<&str> {
    let mut values = Vec::new();
    let (mut start, mut in_target, mut in_quotes) = (0, false, false);
    for (i, c) in header.char_indices() {
        match c {
            '<' if !in_quotes => in_target = true,
            '>' if !in_quotes => in_target = false,
            '"' if !in_target => in_quotes = !in_quotes,
            ',' if !in_target && !in_quotes => {
                values.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    values.push(&header[start..]);
    values
}

pub fn page_info(link: Option<&str>, total_count: Option<u64>) -> PageInfo {
    let relations = link.map(parse_link_header).unwrap_or_default();
    PageInfo {
        next: relations.next,
        prev: relations.prev,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mastodon_link_header() {
        let header = r#"<https://example.com/api/v1/timelines/home?max_id=103>; rel="next", <https://example.com/api/v1/timelines/home?min_id=110>; rel="prev""#;
        let relations = parse_link_header(header);
        assert_eq!(
            relations.next.as_deref(),
            Some("https://example.com/api/v1/timelines/home?max_id=103")
        );
        assert_eq!(
            relations.prev.as_deref(),
            Some("https://example.com/api/v1/timelines/home?min_id=110")
        );
    }

    #[test]
    fn missing_next_means_no_more_pages() {
        let info = page_info(Some(r#"<https://example.com/?min_id=5>; rel="prev""#), None);
        assert_eq!(info.next, None);
        assert!(info.prev.is_some());
        assert_eq!(page_info(None, Some(4)).total_count, Some(4));
    }

    #[test]
    fn ignores_unrelated_and_malformed_parts() {
        let header = r#"garbage, <>; rel="next", <https://example.com/a>; rel="self", <https://example.com/b>; title="x"; rel=next"#;
        let relations = parse_link_header(header);
        assert_eq!(relations.next.as_deref(), Some("https://example.com/b"));
        assert_eq!(relations.prev, None);
    }

    #[test]
    fn commas_inside_targets_and_quotes_are_kept() {
        let header = r#"<https://example.com/api/v1/accounts?id[]=1,2&max_id=9>; title="a, b"; rel="next", <https://example.com/?min_id=5>; rel="prev""#;
        let relations = parse_link_header(header);
        assert_eq!(
            relations.next.as_deref(),
            Some("https://example.com/api/v1/accounts?id[]=1,2&max_id=9")
        );
        assert_eq!(relations.prev.as_deref(), Some("https://example.com/?min_id=5"));
    }
}
