use std::sync::Arc;
use table_columns::columns::{ColumnFormattingState, DisplayMode};
use table_columns::preferences::{
    ColumnDisplayPreferenceStore, FilePreferenceStore, InMemoryPreferenceStore,
};
use tempfile::TempDir;

fn state(store: Arc<dyn ColumnDisplayPreferenceStore>, source: &str) -> ColumnFormattingState {
    let mut state = ColumnFormattingState::new(store);
    state.set_data_source(Some(source.to_string()));
    state.set_visible(true);
    state
}

#[test]
fn test_selecting_active_mode_is_a_no_op() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut state = state(store.clone(), "trades");

    assert!(!state.select("ts", DisplayMode::Formatted));
    let generation = state.generation();

    assert!(state.select("ts", DisplayMode::Original));
    assert!(!state.select("ts", DisplayMode::Original));
    assert_eq!(state.generation(), generation + 1);
    assert_eq!(store.get("trades"), vec!["ts".to_string()]);

    assert!(state.select("ts", DisplayMode::Formatted));
    assert!(store.get("trades").is_empty());
}

#[test]
fn test_toggle_without_data_source_does_nothing() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut state = ColumnFormattingState::new(store.clone());
    state.set_visible(true);

    assert!(!state.toggle("ts"));
    assert_eq!(state.mode_of("ts"), DisplayMode::Formatted);
}

#[test]
fn test_preferences_are_per_data_source() {
    let store = Arc::new(InMemoryPreferenceStore::new());
    let mut state = state(store.clone(), "a");
    state.select("ts", DisplayMode::Original);

    state.set_data_source(Some("b".to_string()));
    assert_eq!(state.mode_of("ts"), DisplayMode::Formatted);

    state.set_data_source(Some("a".to_string()));
    assert_eq!(state.mode_of("ts"), DisplayMode::Original);
}

#[test]
fn test_becoming_visible_picks_up_external_changes() {
    let store: Arc<dyn ColumnDisplayPreferenceStore> = Arc::new(InMemoryPreferenceStore::new());
    let mut first = state(store.clone(), "trades");
    let mut second = state(store.clone(), "trades");

    first.select("ts", DisplayMode::Original);
    // Not re-read while the second table stays visible
    assert_eq!(second.mode_of("ts"), DisplayMode::Formatted);

    second.set_visible(false);
    second.set_visible(true);
    assert_eq!(second.mode_of("ts"), DisplayMode::Original);
}

#[test]
fn test_file_store_shares_choices_across_handles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prefs").join("column_display.json");

    let mut first = state(Arc::new(FilePreferenceStore::new(&path)), "orders");
    first.select("created", DisplayMode::Original);
    first.select("updated", DisplayMode::Original);

    let second = state(Arc::new(FilePreferenceStore::new(&path)), "orders");
    assert_eq!(
        second.original_columns(),
        &["created".to_string(), "updated".to_string()]
    );
}

#[test]
fn test_failed_write_keeps_local_choice() {
    let dir = TempDir::new().unwrap();
    // A directory where the file should be makes every write fail
    let path = dir.path().join("blocked");
    std::fs::create_dir_all(&path).unwrap();

    let mut state = state(Arc::new(FilePreferenceStore::new(&path)), "orders");
    assert!(state.select("created", DisplayMode::Original));
    assert_eq!(state.mode_of("created"), DisplayMode::Original);
}
