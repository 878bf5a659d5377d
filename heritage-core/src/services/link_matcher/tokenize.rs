use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

const STOPWORDS: &[&str] = &[
    "of",
    "and",
    "the",
    "a",
    "an",
    "in",
    "on",
    "for",
    "at",
    "to",
    "from",
    "with",
    "without",
    "city",
    "cities",
    "town",
    "village",
    "province",
    "state",
    "region",
    "national",
    "historic",
    "monuments",
    "cultural",
    "natural",
    "landscape",
    "archaeological",
    "site",
    "area",
    "group",
    "complex",
    "property",
    "properties",
];

fn expand(word: &str) -> &str {
    match word {
        "np" | "npark" | "npk" => "national park",
        "mt" | "mts" => "mount",
        "st" => "saint",
        "sts" => "saints",
        "caves" => "cave",
        other => other,
    }
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

pub fn tokenize(text: &str) -> BTreeSet<String> {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect();

    let cleaned: String = folded
        .replace('&', " and ")
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .flat_map(|w| expand(w).split_whitespace())
        .filter(|w| w.len() > 2 && !is_stopword(w))
        .map(str::to_string)
        .collect()
}
