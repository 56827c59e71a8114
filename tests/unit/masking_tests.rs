/*!
 * Tests for fragment masking
 */

use doctrans::translation::masking::{mask, unmask};

/// Realistic prose from build instructions
const SAMPLES: &[&str] = &[
    "Hello world, see `ls -la` and http://example.com/file.tar.gz",
    "Download https://ftp.gnu.org/gnu/bash/bash-5.2.21.tar.gz (MD5 sum: ad5b38410e3bf0e9bcc20e2765f5e3f9)",
    "Install the package by running `make install` as the root user.",
    "Edit /etc/profile and the file ~/.bashrc, then read README.md and INSTALL.txt.",
    "Both ftp://ftp.example.org/pub/ and https://example.org/a?b=c&d=e work.",
    "The version is 1.2.3 and the archive is libfoo-1.2.3.tar.xz.",
    "Punctuation at the end of a sentence.Then lowercase words follow.",
    "`a` `b` `c` `d` `e` `f` `g` `h` `i` `j` `k` `l`",
    "Unicode prose: Привет мир, смотрите index.html",
    "   leading and trailing whitespace   ",
];

#[test]
fn test_mask_then_unmask_withIdentityBackend_shouldRoundTrip() {
    for sample in SAMPLES {
        let masked = mask(sample);
        let restored = unmask(&masked.text, &masked.map);
        assert_eq!(&restored.text, sample);
        assert!(restored.mismatches.is_empty(), "unexpected mismatch for {sample}");
    }
}

#[test]
fn test_mask_withExampleSentence_shouldHideProtectedFragments() {
    let masked = mask(SAMPLES[0]);

    assert!(masked.text.starts_with("Hello world, see "));
    assert!(!masked.text.contains("ls -la"));
    assert!(!masked.text.contains("example.com"));

    let originals: Vec<&str> = masked.map.iter().map(|(_, original)| original).collect();
    assert_eq!(originals, vec!["`ls -la`", "http://example.com/file.tar.gz"]);
}

#[test]
fn test_mask_withManyFragments_shouldUseDistinctPlaceholders() {
    let masked = mask(SAMPLES[7]);
    let placeholders: Vec<&str> = masked.map.iter().map(|(p, _)| p).collect();
    assert_eq!(placeholders.len(), 12);

    let mut unique = placeholders.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), placeholders.len());

    // no placeholder may be a prefix-collision of another during restoration
    let restored = unmask(&masked.text, &masked.map);
    assert_eq!(restored.text, SAMPLES[7]);
}

#[test]
fn test_mask_withSentencePunctuation_shouldKeepHeuristicBehaviour() {
    // a dot followed by a lowercase word looks like a file name and is protected
    let masked = mask("end of a sentence.then more");
    let originals: Vec<&str> = masked.map.iter().map(|(_, original)| original).collect();
    assert_eq!(originals, vec!["sentence.then"]);
}

#[test]
fn test_unmask_withReorderedPlaceholders_shouldRestoreEach() {
    let masked = mask("Copy a.txt to b.txt");
    let placeholders: Vec<String> = masked.map.iter().map(|(p, _)| p.to_string()).collect();

    // a backend may reorder tokens when translating
    let translated = format!("Скопируйте в {} файл {}", placeholders[1], placeholders[0]);
    let restored = unmask(&translated, &masked.map);

    assert_eq!(restored.text, "Скопируйте в b.txt файл a.txt");
    assert!(restored.mismatches.is_empty());
}

#[test]
fn test_unmask_withDroppedPlaceholder_shouldReportMismatch() {
    let masked = mask("Open index.html and style.css");
    let first = masked.map.iter().next().unwrap().0.to_string();
    let translated = format!("Откройте {}", first);

    let restored = unmask(&translated, &masked.map);

    assert_eq!(restored.text, "Откройте index.html");
    assert_eq!(restored.mismatches.len(), 1);
    assert_eq!(restored.mismatches[0].original, "style.css");
}
