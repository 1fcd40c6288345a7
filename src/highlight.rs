//! Query highlighting for search result names.
//!
//! Marks every case-insensitive, non-overlapping occurrence of the query in a
//! name, scanning left to right. The query is matched literally. The entry
//! itself is never touched; callers get borrowed slices of the name.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

pub fn highlight<'a>(name: &'a str, query: &str) -> Vec<Segment<'a>> {
    let needle: Vec<char> = query.chars().map(fold).collect();
    if needle.is_empty() || name.is_empty() {
        return vec![Segment {
            text: name,
            matched: false,
        }];
    }

    let hay: Vec<(usize, char)> = name.char_indices().map(|(i, c)| (i, fold(c))).collect();
    let byte_at = |idx: usize| hay.get(idx).map(|(b, _)| *b).unwrap_or(name.len());

    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;
    while i + needle.len() <= hay.len() {
        let window = hay[i..i + needle.len()].iter().map(|(_, c)| *c);
        if window.eq(needle.iter().copied()) {
            let start = byte_at(i);
            let end = byte_at(i + needle.len());
            if start > plain_start {
                segments.push(Segment {
                    text: &name[plain_start..start],
                    matched: false,
                });
            }
            segments.push(Segment {
                text: &name[start..end],
                matched: true,
            });
            plain_start = end;
            i += needle.len();
        } else {
            i += 1;
        }
    }

    if plain_start < name.len() {
        segments.push(Segment {
            text: &name[plain_start..],
            matched: false,
        });
    }
    segments
}

/// Renders `name` with every match wrapped in `open`/`close`.
pub fn render_marked(name: &str, query: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(name.len() + 8);
    for segment in highlight(name, query) {
        if segment.matched {
            out.push_str(open);
            out.push_str(segment.text);
            out.push_str(close);
        } else {
            out.push_str(segment.text);
        }
    }
    out
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_every_occurrence_ignoring_case() {
        assert_eq!(
            render_marked("Factura_factura.PDF", "factura", "[", "]"),
            "[Factura]_[factura].PDF"
        );
    }

    #[test]
    fn no_match_yields_plain_name() {
        let segments = highlight("informe.xlsx", "factura");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].matched);
        assert_eq!(segments[0].text, "informe.xlsx");
    }

    #[test]
    fn matches_do_not_overlap() {
        assert_eq!(render_marked("aaaa", "aa", "<", ">"), "<aa><aa>");
        assert_eq!(render_marked("aaa", "aa", "<", ">"), "<aa>a");
    }

    #[test]
    fn query_is_literal_and_unicode_safe() {
        assert_eq!(render_marked("Año(1).txt", "(1)", "[", "]"), "Año[(1)].txt");
        assert_eq!(render_marked("AÑO_año", "año", "[", "]"), "[AÑO]_[año]");
    }

    #[test]
    fn empty_query_marks_nothing() {
        assert_eq!(render_marked("abc", "", "[", "]"), "abc");
    }
}
