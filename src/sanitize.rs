//! Body text sanitizer.
//!
//! Two passes, both total:
//! 1. Code-page repair: C1 control characters (U+0080..U+009F) are what
//!    Windows-1252 punctuation becomes when decoded as ISO-8859-1. They are
//!    mapped back to the character Windows-1252 intended.
//! 2. Typographic punctuation is replaced with ASCII equivalents.
//!
//! Applied once to the raw body template, never to the subject or per row.

use encoding_rs::WINDOWS_1252;

/// Sanitize a body template source.
pub fn sanitize(text: &str) -> String {
    to_ascii_punctuation(&repair_code_page(text))
}

/// Map ISO-8859-1 mis-decodings of Windows-1252 bytes back to Unicode.
pub fn repair_code_page(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ('\u{80}'..='\u{9F}').contains(&ch) {
            let byte = [ch as u32 as u8];
            let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&byte);
            out.push_str(&decoded);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Replace typographic punctuation with ASCII.
pub fn to_ascii_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ascii_replacement(ch) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    out
}

fn ascii_replacement(ch: char) -> Option<&'static str> {
    let replacement = match ch {
        '\u{201A}' => ",",            // single low-9 quotation mark
        '\u{201E}' => ",,",           // double low-9 quotation mark
        '\u{2026}' => "...",          // horizontal ellipsis
        '\u{02C6}' => "^",            // modifier letter circumflex
        '\u{2018}' | '\u{2019}' => "'",
        '\u{201C}' | '\u{201D}' => "\"",
        '\u{2022}' => "*",            // bullet
        '\u{2013}' | '\u{2014}' => "-",
        '\u{2039}' => "<",
        '\u{203A}' => ">",
        _ => return None,
    };
    Some(replacement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_is_unchanged() {
        let text = "Hello {{ name }},\n\nPlain ASCII: 'quotes' \"double\" - dash... <ok>";
        assert_eq!(sanitize(text), text);
    }

    #[test]
    fn em_dash_and_right_double_quote() {
        assert_eq!(
            sanitize("Wait\u{2014}he said \u{201C}hi\u{201D} ok"),
            "Wait-he said \"hi\" ok"
        );
    }

    #[test]
    fn full_substitution_table() {
        let input = "\u{201A}\u{201E}\u{2026}\u{02C6}\u{2018}\u{2019}\u{201C}\u{201D}\u{2022}\u{2013}\u{2014}\u{2039}\u{203A}";
        assert_eq!(sanitize(input), ",,,...^''\"\"*--<>");
    }

    #[test]
    fn c1_controls_repaired_then_substituted() {
        // U+0093/U+0094 are Windows-1252 curly quotes read as Latin-1.
        // U+0085 is the ellipsis, U+0096 the en dash.
        assert_eq!(
            sanitize("\u{93}Hi\u{94}\u{85} a\u{96}b"),
            "\"Hi\"... a-b"
        );
    }

    #[test]
    fn c1_repair_keeps_non_table_characters() {
        // U+0080 is the euro sign, U+0099 the trade mark sign.
        assert_eq!(repair_code_page("\u{80}5\u{99}"), "\u{20AC}5\u{2122}");
    }

    #[test]
    fn non_punctuation_unicode_untouched() {
        assert_eq!(sanitize("Grüße, café, 日本"), "Grüße, café, 日本");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let samples = [
            "",
            "plain",
            "\u{2014}\u{201C}quoted\u{201D}\u{2026}",
            "\u{80}\u{81}\u{8D}\u{8F}\u{90}\u{9D}\u{9F}",
            "mixed \u{93}c1\u{94} and \u{2018}typo\u{2019} \u{2039}x\u{203A}",
            "Grüße \u{2022} item",
        ];
        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
