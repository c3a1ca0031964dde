use std::borrow::Cow;
use std::fs;

use tcsv_translator::container::{self, encrypt_file, MIN_CONTAINER_LEN};
use tcsv_translator::csv_row::{encode_row, split_row, unescape};
use tcsv_translator::{ContainerKey, FsStorage, Translator, TranslatorConfig};

const ROWS: &str = "source,target\n\
Potion,물약\n\
Hi-Potion,하이포션\n\
\"Hello, traveler\",\"안녕, 여행자\"\n\
Line one\\nLine two,첫 줄\\n둘째 줄\n";

#[test]
fn encrypted_dictionary_is_materialized_and_used() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let staging = tmp.path().join("staging.csv");
    fs::write(&staging, ROWS).expect("write");

    let cfg = TranslatorConfig::with_assets_dir(tmp.path().join("StreamingAssets"));
    encrypt_file(&FsStorage, &staging, &cfg.encrypted_path(), &ContainerKey::default())
        .expect("encrypt");
    assert!(!cfg.plain_path().exists());

    let translator = Translator::new(cfg.clone());
    assert_eq!(translator.translate("Potion"), "물약");
    assert_eq!(translator.translate("Hello, traveler"), "안녕, 여행자");
    assert_eq!(translator.translate("Line one\r\nLine two"), "첫 줄\n둘째 줄");
    assert_eq!(translator.translate_smart("Hi-Potion x2, Potion x5"), "하이포션 x2, 물약 x5");

    // The plaintext is written once; later engines read it directly.
    assert_eq!(fs::read_to_string(cfg.plain_path()).expect("read"), ROWS);
    fs::remove_file(cfg.encrypted_path()).expect("remove");
    let second = Translator::new(cfg);
    assert_eq!(second.translate("Potion"), "물약");
}

#[test]
fn wrong_key_degrades_to_identity() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let staging = tmp.path().join("staging.csv");
    fs::write(&staging, "source,target\nabc,xyzw12345678\n").expect("write");

    let cfg = TranslatorConfig {
        key: Some("AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=".to_string()),
        ..TranslatorConfig::with_assets_dir(tmp.path())
    };
    encrypt_file(&FsStorage, &staging, &cfg.encrypted_path(), &ContainerKey::default())
        .expect("encrypt");

    let translator = Translator::new(cfg.clone());
    let out = translator.translate("abc");
    assert_eq!(out, "abc");
    assert!(matches!(out, Cow::Borrowed(_)));
    assert_eq!(translator.translate_with_substring("abc"), "abc");
}

#[test]
fn truncated_container_is_ignored() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let cfg = TranslatorConfig::with_assets_dir(tmp.path());
    fs::write(cfg.encrypted_path(), &b"TCSV1\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0"[..]).expect("write");
    assert!(fs::metadata(cfg.encrypted_path()).expect("meta").len() < MIN_CONTAINER_LEN as u64);

    assert!(!container::decrypt_to_plaintext(
        &FsStorage,
        &cfg.encrypted_path(),
        &cfg.plain_path(),
        &ContainerKey::default(),
    ));
    assert!(!cfg.plain_path().exists());

    let translator = Translator::new(cfg);
    assert_eq!(translator.translate_smart("anything"), "anything");
}

#[test]
fn missing_assets_are_identity() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let translator = Translator::new(TranslatorConfig::with_assets_dir(tmp.path().join("none")));
    for s in ["", "plain", "multi\r\nline"] {
        assert_eq!(translator.translate(s), s);
        assert_eq!(translator.translate_with_substring(s), s);
        assert_eq!(translator.translate_smart(s), s);
    }
}

#[test]
fn csv_escaping_round_trips() {
    let source = "Comma, \"quote\"\nnewline";
    let line = encode_row([source, "target"]);
    let fields = split_row(&line);
    assert_eq!(unescape(&fields[0]), source);
    assert_eq!(unescape(&fields[1]), "target");
}
