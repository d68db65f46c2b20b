//! Unit tests for session configuration.

use super::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct KeyDir {
    dir: TempDir,
}

impl KeyDir {
    fn with_key(&self, len: usize) -> PathBuf {
        let path = self.dir.path().join("session_key");
        std::fs::write(&path, vec![b'k'; len]).expect("key file written");
        path
    }

    fn missing(&self) -> PathBuf {
        self.dir.path().join("absent")
    }
}

#[fixture]
fn keys() -> KeyDir {
    KeyDir {
        dir: tempfile::tempdir().expect("temporary directory"),
    }
}

fn settings(key_file: PathBuf) -> AppSettings {
    AppSettings {
        session_key_file: Some(key_file),
        ..AppSettings::default()
    }
}

#[rstest]
fn full_length_key_with_defaults_is_accepted(keys: KeyDir) {
    let session = session_settings(&settings(keys.with_key(64)), BuildMode::Release)
        .expect("valid settings");
    assert!(session.cookie_secure);
    assert_eq!(session.same_site, SameSite::Lax);
}

#[rstest]
fn same_key_material_derives_the_same_key(keys: KeyDir) {
    let path = keys.with_key(64);
    let first = session_settings(&settings(path.clone()), BuildMode::Release).expect("first");
    let second = session_settings(&settings(path), BuildMode::Release).expect("second");
    assert_eq!(
        fingerprint::key_fingerprint(&first.key),
        fingerprint::key_fingerprint(&second.key)
    );
}

#[rstest]
#[case("strict", SameSite::Strict)]
#[case("Lax", SameSite::Lax)]
#[case(" NONE ", SameSite::None)]
fn same_site_values_are_case_insensitive(
    keys: KeyDir,
    #[case] raw: &str,
    #[case] expected: SameSite,
) {
    let mut app = settings(keys.with_key(64));
    app.session_same_site = Some(raw.to_owned());
    let session = session_settings(&app, BuildMode::Release).expect("valid settings");
    assert_eq!(session.same_site, expected);
}

#[rstest]
fn release_rejects_a_missing_key_file(keys: KeyDir) {
    let err = session_settings(&settings(keys.missing()), BuildMode::Release)
        .err()
        .expect("missing key should fail");
    assert!(matches!(err, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn ephemeral_flag_allows_a_generated_key_in_release(keys: KeyDir) {
    let mut app = settings(keys.missing());
    app.session_allow_ephemeral = true;
    assert!(session_settings(&app, BuildMode::Release).is_ok());
}

#[rstest]
fn debug_generates_a_key_when_the_file_is_missing(keys: KeyDir) {
    assert!(session_settings(&settings(keys.missing()), BuildMode::Debug).is_ok());
}

#[rstest]
#[case(BuildMode::Release, false)]
#[case(BuildMode::Debug, true)]
fn short_keys_only_pass_in_debug(keys: KeyDir, #[case] mode: BuildMode, #[case] ok: bool) {
    let result = session_settings(&settings(keys.with_key(32)), mode);
    assert_eq!(result.is_ok(), ok);
    if let Err(err) = result {
        assert!(matches!(err, SessionConfigError::KeyTooShort { length: 32, .. }));
    }
}

#[rstest]
fn release_rejects_same_site_none_without_secure(keys: KeyDir) {
    let mut app = settings(keys.with_key(64));
    app.session_same_site = Some("None".to_owned());
    app.session_cookie_secure = Some(false);
    let err = session_settings(&app, BuildMode::Release)
        .err()
        .expect("insecure None should fail");
    assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
#[case(BuildMode::Release, None)]
#[case(BuildMode::Debug, Some(SameSite::Lax))]
fn unknown_same_site_values(
    keys: KeyDir,
    #[case] mode: BuildMode,
    #[case] expected: Option<SameSite>,
) {
    let mut app = settings(keys.with_key(64));
    app.session_same_site = Some("sideways".to_owned());
    let result = session_settings(&app, mode);
    assert_eq!(result.as_ref().ok().map(|s| s.same_site), expected);
    if let Err(err) = result {
        assert!(matches!(err, SessionConfigError::InvalidSameSite { .. }));
    }
}
