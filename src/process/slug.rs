// src/process/slug.rs

/// Accented letters and separators folded to ASCII before filtering.
/// Applied one pair at a time, in this order.
const FOLD_TABLE: [(char, char); 28] = [
    ('à', 'a'),
    ('á', 'a'),
    ('ä', 'a'),
    ('â', 'a'),
    ('è', 'e'),
    ('é', 'e'),
    ('ë', 'e'),
    ('ê', 'e'),
    ('ì', 'i'),
    ('í', 'i'),
    ('ï', 'i'),
    ('î', 'i'),
    ('ò', 'o'),
    ('ó', 'o'),
    ('ö', 'o'),
    ('ô', 'o'),
    ('ù', 'u'),
    ('ú', 'u'),
    ('ü', 'u'),
    ('û', 'u'),
    ('ñ', 'n'),
    ('ç', 'c'),
    ('·', '-'),
    ('/', '-'),
    ('_', '-'),
    (',', '-'),
    (':', '-'),
    (';', '-'),
];

fn fold_char(c: char) -> char {
    FOLD_TABLE
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
        .unwrap_or(c)
}

/// Turn a column label into a lowercase, hyphenated ASCII key.
///
/// `"Height (in)"` becomes `"height-in"`. Hyphens at either end are kept, so
/// a label made only of separators slugs to `"-"`.
pub fn slugify(text: &str) -> String {
    // U+FEFF counts as whitespace at the edges of a label
    let lowered = text
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
        .to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars().map(fold_char) {
        match c {
            'a'..='z' | '0'..='9' => out.push(c),
            // spaces become hyphens, and any run of either collapses to one
            ' ' | '-' => {
                if !out.ends_with('-') {
                    out.push('-');
                }
            }
            _ => {}
        }
    }
    out
}
