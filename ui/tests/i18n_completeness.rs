//! Bundle consistency: every `t!` key used under `src/` is defined in the
//! fallback bundle, every locale defines exactly the fallback's keys, and no
//! bundle defines a key twice.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const BUNDLE: &str = "normscope-ui.ftl";
const FALLBACK: &str = "en-US";

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Message ids in definition order. Terms (`-x`), attributes (`.x`),
/// comments, select variants and continuation lines are skipped.
fn message_ids(ftl: &str) -> Vec<String> {
    ftl.lines()
        .filter(|line| !line.starts_with([' ', '\t', '#', '-', '.']))
        .filter_map(|line| line.split_once('='))
        .map(|(id, _)| id.trim().to_string())
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
        .collect()
}

fn bundles() -> Vec<(String, String)> {
    let mut found: Vec<(String, String)> = fs::read_dir(crate_root().join("i18n"))
        .expect("i18n directory")
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| {
            let locale = entry.file_name().to_string_lossy().to_string();
            let text = fs::read_to_string(entry.path().join(BUNDLE))
                .unwrap_or_else(|err| panic!("{locale}/{BUNDLE}: {err}"));
            (locale, text)
        })
        .collect();
    found.sort();
    found
}

/// First literal argument of every `t!(` call in the Rust files under `dir`.
fn keys_used_in(dir: &Path, keys: &mut BTreeSet<String>) {
    for entry in fs::read_dir(dir).expect("readable source dir").flatten() {
        let path = entry.path();
        if path.is_dir() {
            keys_used_in(&path, keys);
            continue;
        }
        if path.extension().map_or(true, |ext| ext != "rs") {
            continue;
        }
        let source = fs::read_to_string(&path).expect("readable source file");
        for (at, call) in source.match_indices("t!(\"") {
            // `format!(` and `assert!(` also end in `t!(`.
            let joined = source[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || c == '_');
            if joined {
                continue;
            }
            let rest = &source[at + call.len()..];
            if let Some(end) = rest.find('"') {
                keys.insert(rest[..end].to_string());
            }
        }
    }
}

#[test]
fn every_used_key_is_in_the_fallback_bundle() {
    let (_, fallback) = bundles()
        .into_iter()
        .find(|(locale, _)| locale == FALLBACK)
        .expect("fallback bundle present");
    let defined: BTreeSet<String> = message_ids(&fallback).into_iter().collect();

    let mut used = BTreeSet::new();
    keys_used_in(&crate_root().join("src"), &mut used);
    assert!(used.contains("nav-home"), "scan found no keys");

    let missing: Vec<_> = used.difference(&defined).collect();
    assert!(missing.is_empty(), "keys missing from {FALLBACK}: {missing:?}");
}

#[test]
fn locales_define_the_same_keys() {
    let bundles = bundles();
    assert!(bundles.len() >= 2, "expected at least one translation");
    let reference: BTreeSet<String> = bundles
        .iter()
        .find(|(locale, _)| locale == FALLBACK)
        .map(|(_, text)| message_ids(text).into_iter().collect())
        .expect("fallback bundle present");

    for (locale, text) in &bundles {
        let keys: BTreeSet<String> = message_ids(text).into_iter().collect();
        let missing: Vec<_> = reference.difference(&keys).collect();
        let extra: Vec<_> = keys.difference(&reference).collect();
        assert!(
            missing.is_empty() && extra.is_empty(),
            "{locale}: missing {missing:?}, extra {extra:?}"
        );
    }
}

#[test]
fn no_bundle_defines_a_key_twice() {
    for (locale, text) in bundles() {
        let mut seen = BTreeSet::new();
        let dups: Vec<_> = message_ids(&text)
            .into_iter()
            .filter(|id| !seen.insert(id.clone()))
            .collect();
        assert!(dups.is_empty(), "{locale} repeats {dups:?}");
    }
}
