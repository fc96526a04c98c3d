use lyrics_live::settings::{DisplaySettings, LocalSettings, SettingsStore};
use lyrics_live::{Alignment, Language};

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::in_dir(dir.path());
    assert_eq!(store.load(), LocalSettings::default());
}

#[test]
fn test_saved_settings_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::in_dir(&dir.path().join("data"));
    let settings = LocalSettings {
        dark_theme: true,
        display: DisplaySettings {
            alignment: Alignment::SideBySide,
            visible_languages: vec![Language::Hindi, Language::English],
            tamil_font_size: 30,
            ..DisplaySettings::default()
        },
    };
    store.save(&settings).unwrap();
    assert_eq!(store.load(), settings);
}

#[test]
fn test_unknown_alignment_and_garbage_fall_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::in_dir(dir.path());

    std::fs::write(store.path(), "[display]\nalignment = \"upside-down\"\n").unwrap();
    assert_eq!(store.load().display.alignment, Alignment::TopBottom);

    std::fs::write(store.path(), "dark_theme = [[[").unwrap();
    assert_eq!(store.load(), LocalSettings::default());
}
