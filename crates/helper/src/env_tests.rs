// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use rstest::rstest;
use tempfile::TempDir;

fn dir_with(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }
    dir
}

#[rstest]
#[case(&[".env.example", ".env", ".env.testing"], ".env.testing")]
#[case(&[".env.example", ".env"], ".env")]
#[case(&[".env.example"], ".env.example")]
fn test_find_env_file_precedence(#[case] present: &[&str], #[case] expected: &str) {
    let files: Vec<(&str, &str)> = present.iter().map(|name| (*name, "")).collect();
    let dir = dir_with(&files);
    assert_eq!(find_env_file(dir.path()), Some(dir.path().join(expected)));
}

#[test]
fn test_find_env_file_none() {
    let dir = dir_with(&[("env", "")]);
    assert_eq!(find_env_file(dir.path()), None);
}

#[test]
fn test_load_env_file_values() {
    let dir = dir_with(&[(
        ".env",
        "# app settings\n\
         APP_NAME=Shop\n\
         \n\
         export APP_ENV=testing\n\
         QUOTED=\"two words\"\n\
         SINGLE='${APP_NAME} literal'\n\
         ESCAPED=\"line\\nbreak \\\"quoted\\\"\"\n\
         TRAILING=value # comment\n\
         EMPTY=\n\
         HASH=abc#def\n",
    )]);

    let vars = load_env_file(&dir.path().join(".env")).unwrap();

    assert_eq!(vars["APP_NAME"], "Shop");
    assert_eq!(vars["APP_ENV"], "testing");
    assert_eq!(vars["QUOTED"], "two words");
    assert_eq!(vars["SINGLE"], "${APP_NAME} literal");
    assert_eq!(vars["ESCAPED"], "line\nbreak \"quoted\"");
    assert_eq!(vars["TRAILING"], "value");
    assert_eq!(vars["EMPTY"], "");
    assert_eq!(vars["HASH"], "abc#def");
}

#[test]
fn test_expansion_uses_earlier_keys() {
    let vars = parse_env("HOST=example.test\nURL=\"https://${HOST}/api\"\nBARE=${HOST}:80\n").unwrap();
    assert_eq!(vars["URL"], "https://example.test/api");
    assert_eq!(vars["BARE"], "example.test:80");
}

#[test]
fn test_expansion_of_unknown_is_empty() {
    let vars = parse_env("A=x${TEST_HELPER_SURELY_UNSET_VARIABLE}y\n").unwrap();
    assert_eq!(vars["A"], "xy");
}

#[rstest]
#[case("NOEQUALS", 1)]
#[case("A=1\n1BAD=2", 2)]
#[case("A=1\nB=\"open", 2)]
#[case("C='open", 1)]
fn test_syntax_errors_report_line(#[case] text: &str, #[case] line: usize) {
    let (at, _) = parse_env(text).unwrap_err();
    assert_eq!(at, line);
}

#[test]
fn test_load_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_env_file(&dir.path().join(".env")).unwrap_err();
    assert!(matches!(err, EnvError::Read { .. }));
}

#[test]
fn test_syntax_error_names_file() {
    let dir = dir_with(&[(".env", "OK=1\nbroken line\n")]);
    let err = load_env_file(&dir.path().join(".env")).unwrap_err();
    assert!(err.to_string().ends_with(".env:2: expected KEY=VALUE, got \"broken line\""));
}

#[test]
fn test_environment_records_file() {
    let dir = dir_with(&[(".env", "TEST_HELPER_ONLY_IN_FILE=1\n")]);
    let env = Environment::load(dir.path()).unwrap();

    assert_eq!(env.file(), Some(dir.path().join(".env").as_path()));
    assert_eq!(env.get("TEST_HELPER_ONLY_IN_FILE").as_deref(), Some("1"));
    assert_eq!(env.file_value("TEST_HELPER_ONLY_IN_FILE"), Some("1"));
}

#[test]
fn test_environment_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let env = Environment::load(dir.path()).unwrap();
    assert!(env.file().is_none());
    assert!(env.file_value(APP_KEY).is_none());
}

#[test]
fn test_settings_from_file() {
    let env = Environment::from_values(
        [
            ("APP_URL", "https://shop.test"),
            ("APP_KEY", "base64:abc"),
            ("APP_CIPHER", "AES-128-CBC"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    );

    let settings = TestSettings::from_environment(&env);

    assert_eq!(settings.url, "https://shop.test");
    assert_eq!(settings.key.as_deref(), Some("base64:abc"));
    assert_eq!(settings.cipher, "AES-128-CBC");
}

#[test]
fn test_settings_defaults() {
    let settings = TestSettings::from_environment(&Environment::default());
    assert_eq!(settings, TestSettings::default());
    assert_eq!(settings.cipher, DEFAULT_CIPHER);
}

#[test]
fn test_settings_load_reads_directory() {
    let dir = dir_with(&[
        (".env", "APP_CIPHER=AES-256-CBC\n"),
        (".env.testing", "APP_CIPHER=AES-128-GCM\nAPP_KEY=\n"),
    ]);
    let settings = TestSettings::load(dir.path()).unwrap();
    assert_eq!(settings.cipher, "AES-128-GCM");
    assert_eq!(settings.key, None);
}

#[test]
fn test_generate_app_key_keeps_existing() {
    let mut settings = TestSettings {
        key: Some("base64:existing".to_string()),
        ..TestSettings::default()
    };
    assert_eq!(settings.generate_app_key().unwrap(), "base64:existing");
}

#[rstest]
#[case("AES-256-CBC", 32)]
#[case("aes-128-cbc", 16)]
#[case("AES-256-GCM", 32)]
#[case("AES-128-GCM", 16)]
fn test_generate_app_key_sized_for_cipher(#[case] cipher: &str, #[case] len: usize) {
    let mut settings = TestSettings {
        cipher: cipher.to_string(),
        ..TestSettings::default()
    };

    let key = settings.generate_app_key().unwrap();

    let encoded = key.strip_prefix("base64:").unwrap();
    assert_eq!(STANDARD.decode(encoded).unwrap().len(), len);
    assert_eq!(settings.key.as_deref(), Some(key.as_str()));
    assert_eq!(settings.generate_app_key().unwrap(), key);
}

#[test]
fn test_generate_app_key_rejects_unknown_cipher() {
    let mut settings = TestSettings {
        cipher: "ROT13".to_string(),
        ..TestSettings::default()
    };
    assert!(matches!(settings.generate_app_key(), Err(EnvError::Cipher(c)) if c == "ROT13"));
    assert!(settings.key.is_none());
}
