use std::borrow::Cow;

use quick_xml::escape::resolve_html5_entity;

use crate::{Feed, Item};

// Longest HTML5 entity name is "CounterClockwiseContourIntegral".
const MAX_ENTITY_LEN: usize = 32;

// Entities HTML5 recognizes even without a terminating `;`.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr",
    "micro", "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm",
    "oslash", "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy",
    "sup1", "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];
const LONGEST_LEGACY_ENTITY: usize = 6;

/// Resolve HTML character references in `input`.
///
/// Follows the HTML5 rules: named references from the HTML5 table, the
/// legacy names that may omit their `;`, and decimal or hexadecimal
/// references with or without `;`. Anything else is kept as written, so plain
/// text passes through untouched.
pub fn unescape_html(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match resolve_reference(after) {
            Some((replacement, consumed)) => {
                out.push_str(&replacement);
                rest = &after[consumed..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Resolves the reference at the start of `s` (just after `&`). Returns the
/// replacement text and the number of bytes consumed.
fn resolve_reference(s: &str) -> Option<(Cow<'static, str>, usize)> {
    match s.strip_prefix('#') {
        Some(number) => {
            let (c, consumed) = resolve_number(number)?;
            Some((Cow::Owned(c.to_string()), consumed + 1))
        }
        None => resolve_named(s),
    }
}

fn resolve_named(s: &str) -> Option<(Cow<'static, str>, usize)> {
    let len = s
        .bytes()
        .take(MAX_ENTITY_LEN)
        .take_while(u8::is_ascii_alphanumeric)
        .count();
    let name = &s[..len];
    if s[len..].starts_with(';') {
        if let Some(value) = resolve_html5_entity(name) {
            return Some((Cow::Borrowed(value), len + 1));
        }
    }
    // Longest legacy name that prefixes the run, e.g. "&copy2024".
    (2..=len.min(LONGEST_LEGACY_ENTITY)).rev().find_map(|n| {
        let prefix = &name[..n];
        if LEGACY_ENTITIES.contains(&prefix) {
            resolve_html5_entity(prefix).map(|value| (Cow::Borrowed(value), n))
        } else {
            None
        }
    })
}

fn resolve_number(s: &str) -> Option<(char, usize)> {
    let (radix, marker) = match s.as_bytes().first() {
        Some(b'x' | b'X') => (16, 1),
        _ => (10, 0),
    };
    let body = &s[marker..];
    let digits = body
        .bytes()
        .take_while(|b| char::from(*b).is_digit(radix))
        .count();
    if digits == 0 {
        return None;
    }
    // Only digits remain, so the sole failure is overflow.
    let code = u32::from_str_radix(&body[..digits], radix).unwrap_or(u32::MAX);
    let terminator = usize::from(body[digits..].starts_with(';'));
    Some((code_point(code), marker + digits + terminator))
}

fn code_point(code: u32) -> char {
    match code {
        // C1 controls are read as windows-1252, as browsers do.
        0x80..=0x9F => u8::try_from(code)
            .ok()
            .and_then(|byte| {
                let bytes = [byte];
                let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(&bytes);
                text.chars().next()
            })
            .unwrap_or(char::REPLACEMENT_CHARACTER),
        0 => char::REPLACEMENT_CHARACTER,
        _ => char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

impl Item {
    /// Copy with `title` and `description` unescaped; `link` and
    /// `published_at` are kept verbatim.
    pub fn sanitized(&self) -> Item {
        Item {
            title: unescape_html(&self.title).into_owned(),
            link: self.link.clone(),
            description: unescape_html(&self.description).into_owned(),
            published_at: self.published_at.clone(),
        }
    }
}

impl Feed {
    /// Copy with every free-text field unescaped, items in the same order.
    pub fn sanitized(&self) -> Feed {
        Feed {
            title: unescape_html(&self.title).into_owned(),
            link: self.link.clone(),
            description: unescape_html(&self.description).into_owned(),
            items: self.items.iter().map(Item::sanitized).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unchanged() {
        for plain in ["Tech & Life", "a && b", "R&D; dept", "100% &", ""] {
            assert_eq!(unescape_html(plain), plain);
        }
        assert!(matches!(unescape_html("no refs"), Cow::Borrowed(_)));
    }

    #[test]
    fn named_and_numeric_references_resolve() {
        assert_eq!(unescape_html("Tech &amp; Life"), "Tech & Life");
        assert_eq!(unescape_html("&lt;b&gt;bold&lt;/b&gt;"), "<b>bold</b>");
        assert_eq!(unescape_html("&quot;hi&quot; &#39;x&#39;"), "\"hi\" 'x'");
        assert_eq!(unescape_html("caf&eacute; &#x263A; &#9731;"), "café ☺ ☃");
        assert_eq!(unescape_html("non&nbsp;breaking"), "non\u{a0}breaking");
    }

    #[test]
    fn unknown_and_broken_references_are_kept() {
        assert_eq!(unescape_html("&bogus; &Dagger"), "&bogus; &Dagger");
        assert_eq!(unescape_html("&#xZZ; &#; &#x;"), "&#xZZ; &#; &#x;");
        assert_eq!(unescape_html("&#+65; &#-65; &#x+41;"), "&#+65; &#-65; &#x+41;");
        assert_eq!(unescape_html("&#0;"), "\u{fffd}");
        assert_eq!(unescape_html("&#99999999999;"), "\u{fffd}");
    }

    #[test]
    fn legacy_references_resolve_without_semicolon() {
        assert_eq!(
            unescape_html("&copy 2024 &amp Co &#39quoted"),
            "\u{a9} 2024 & Co 'quoted"
        );
        assert_eq!(unescape_html("Fish &amp Chips"), "Fish & Chips");
        assert_eq!(unescape_html("&lt;b&gtbold"), "<b>bold");
        assert_eq!(unescape_html("&notit; &ampx"), "\u{ac}it; &x");
        assert_eq!(unescape_html("&#x41B &#65;"), "\u{41b} A");
    }

    #[test]
    fn c1_references_map_like_windows_1252() {
        assert_eq!(unescape_html("&#128; &#x93;hi&#x94;"), "\u{20ac} \u{201c}hi\u{201d}");
    }

    #[test]
    fn escape_then_unescape_round_trips() {
        let original = "Fish & Chips <daily> \"special\"";
        let escaped = quick_xml::escape::escape(original);
        assert_ne!(escaped, original);
        assert_eq!(unescape_html(&escaped), original);
    }

    #[test]
    fn unescaping_twice_is_a_no_op_on_plain_output() {
        let once = unescape_html("A &amp; B &lt;C&gt;").into_owned();
        assert_eq!(unescape_html(&once), once);
    }

    #[test]
    fn feed_sanitizes_text_and_keeps_links() {
        let feed = Feed {
            title: "Tech &amp; Life".into(),
            link: "https://example.com/?a=1&amp;b=2".into(),
            description: "News &lt;daily&gt;".into(),
            items: vec![
                Item {
                    title: "One &amp; Two".into(),
                    link: "https://example.com/1".into(),
                    description: "&quot;quoted&quot;".into(),
                    published_at: "Mon, 01 Jan 2024 00:00:00 &amp; GMT".into(),
                },
                Item {
                    title: "Three".into(),
                    ..Item::default()
                },
            ],
        };

        let clean = feed.sanitized();
        assert_eq!(clean.title, "Tech & Life");
        assert_eq!(clean.link, feed.link);
        assert_eq!(clean.description, "News <daily>");
        assert_eq!(clean.items.len(), 2);
        assert_eq!(clean.items[0].title, "One & Two");
        assert_eq!(clean.items[0].description, "\"quoted\"");
        assert_eq!(clean.items[0].published_at, feed.items[0].published_at);
        assert_eq!(clean.items[1].title, "Three");
    }

    #[test]
    fn empty_feed_is_still_sanitized() {
        let feed = Feed {
            title: "A &amp; B".into(),
            ..Feed::default()
        };
        let clean = feed.sanitized();
        assert_eq!(clean.title, "A & B");
        assert!(clean.items.is_empty());
    }
}
