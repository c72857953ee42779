// Integration tests for the built-in site datasets.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use cyber_deck::chat::{CHAT_RESPONSES, DEFAULT_RESPONSES, SYSTEM_PREFIXES};

#[test]
fn chat_keywords_are_unique_lowercase() {
    let mut seen = HashSet::new();
    for (keyword, replies) in CHAT_RESPONSES {
        assert!(seen.insert(*keyword), "duplicate keyword '{}'", keyword);
        assert_eq!(*keyword, keyword.to_lowercase(), "keyword '{}' must be lowercase", keyword);
        assert!(!keyword.trim().is_empty());
        assert!(!replies.is_empty(), "keyword '{}' has no replies", keyword);
    }
    assert!(!DEFAULT_RESPONSES.is_empty());
}

#[test]
fn chat_replies_have_a_speaker() {
    let all = CHAT_RESPONSES
        .iter()
        .flat_map(|(_, r)| r.iter())
        .chain(DEFAULT_RESPONSES.iter());
    for reply in all {
        assert!(reply.contains(':'), "reply '{}' has no speaker prefix", reply);
    }
}

#[test]
fn every_system_prefix_is_used() {
    for prefix in SYSTEM_PREFIXES {
        let used = CHAT_RESPONSES
            .iter()
            .flat_map(|(_, r)| r.iter())
            .any(|r| r.starts_with(prefix));
        assert!(used, "no reply starts with '{}'", prefix);
    }
}

#[test]
fn boot_lines_are_printable() {
    assert_eq!(cyber_deck::BOOT_LINES.len(), 7);
    for line in cyber_deck::BOOT_LINES {
        assert!(!line.is_empty());
        assert!(line.is_ascii(), "boot line '{}' is not ascii", line);
    }
}

#[test]
fn secret_code_is_the_konami_code() {
    use cyber_deck::SECRET_CODE;
    assert_eq!(SECRET_CODE.len(), 10);
    assert_eq!(&SECRET_CODE[8..], &["b", "a"]);
    assert!(SECRET_CODE[..8].iter().all(|k| k.starts_with("Arrow")));
}

#[test]
fn rain_glyphs_do_not_repeat() {
    let glyphs = cyber_deck::RAIN_GLYPHS;
    let unique: HashSet<char> = glyphs.chars().collect();
    assert_eq!(unique.len(), glyphs.chars().count());
    assert!(glyphs.chars().all(|c| c.is_ascii_graphic()));
}
