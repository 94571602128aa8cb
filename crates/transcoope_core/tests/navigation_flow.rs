mod support;

use std::time::Duration;
use support::{start_session, ScriptedLoader};
use transcoope_core::{MemoryKvStore, NavigatorState, Section};

#[tokio::test]
async fn unknown_fragment_opens_dashboard() {
    let (mut session, renderer) = start_session(MemoryKvStore::new(), ScriptedLoader::default());
    assert_eq!(session.navigator().state(), NavigatorState::Uninitialized);

    session.open(Some("#does-not-exist")).await;

    assert_eq!(session.navigator().active(), Some(Section::Dashboard));
    let log = renderer.log();
    assert_eq!(log.fragment, "dashboard");
    assert_eq!(log.title, "Home | TransCoope");
    assert_eq!(log.visible.iter().copied().collect::<Vec<_>>(), vec![Section::Dashboard]);
}

#[tokio::test]
async fn startup_fragment_selects_section() {
    let (mut session, renderer) = start_session(MemoryKvStore::new(), ScriptedLoader::default());
    session.open(Some("#library")).await;

    assert_eq!(session.navigator().active(), Some(Section::Library));
    assert_eq!(renderer.log().title, "My Library | TransCoope");
}

#[tokio::test]
async fn each_section_is_loaded_at_most_once() {
    let loader = ScriptedLoader::new(Duration::from_millis(5));
    let (mut session, renderer) = start_session(MemoryKvStore::new(), loader.clone());
    session.open(None).await;

    for _ in 0..2 {
        for section in Section::ALL {
            session.navigate(section.id()).await;
            assert_eq!(session.navigator().active(), Some(section));
        }
    }

    for section in Section::ALL {
        assert_eq!(loader.calls_for(section), 1, "{section}");
    }
    assert_eq!(renderer.log().rendered.len(), Section::ALL.len());
}

#[tokio::test]
async fn prerendered_panel_is_not_loaded() {
    let loader = ScriptedLoader::default();
    let (mut session, renderer) = start_session(MemoryKvStore::new(), loader.clone());
    renderer.prefill(Section::Projects);

    session.navigate("projects").await;

    assert_eq!(session.navigator().active(), Some(Section::Projects));
    assert_eq!(loader.calls_for(Section::Projects), 0);
    assert!(session.navigator().is_loaded(Section::Projects));
}

#[tokio::test]
async fn failed_load_keeps_section_active_and_retries_later() {
    let loader = ScriptedLoader::default().failing(Section::Community);
    let (mut session, renderer) = start_session(MemoryKvStore::new(), loader.clone());
    session.open(None).await;

    session.navigate("community").await;
    assert_eq!(session.navigator().active(), Some(Section::Community));
    assert!(!session.navigator().is_loading());
    assert!(renderer.log().has_toast("Failed to load content"));
    assert_eq!(renderer.log().fragment, "community");

    session.navigate("dashboard").await;
    session.navigate("community").await;
    assert_eq!(loader.calls_for(Section::Community), 2);
}

#[tokio::test]
async fn reselecting_active_section_changes_nothing() {
    let loader = ScriptedLoader::default();
    let (mut session, renderer) = start_session(MemoryKvStore::new(), loader.clone());
    session.navigate("trending").await;
    let toasts_before = renderer.log().toasts.len();

    session.navigate("#trending").await;

    assert_eq!(loader.calls(), vec![Section::Trending]);
    assert_eq!(renderer.log().toasts.len(), toasts_before);
}

#[tokio::test]
async fn dashboard_visit_seeds_recent_activity() {
    let (mut session, _renderer) = start_session(MemoryKvStore::new(), ScriptedLoader::default());
    assert!(session.profile().recent_activity.is_empty());

    session.open(None).await;

    assert!(!session.profile().recent_activity.is_empty());
}

#[tokio::test]
async fn quick_actions_route_to_sections() {
    use transcoope_core::QuickAction;

    let (mut session, renderer) = start_session(MemoryKvStore::new(), ScriptedLoader::default());
    session.open(None).await;

    session.quick_action(QuickAction::NewTranscription).await;
    assert_eq!(session.navigator().active(), Some(Section::Transcribe));

    session.quick_action(QuickAction::NewProject).await;
    assert_eq!(session.navigator().active(), Some(Section::Transcribe));
    assert!(renderer.log().has_toast("Project creation is coming soon"));
}

#[tokio::test]
async fn recommendation_clicks_map_to_sections() {
    let (mut session, renderer) = start_session(MemoryKvStore::new(), ScriptedLoader::default());

    assert_eq!(session.recommendation_clicked(1), None);
    assert!(renderer.log().has_toast("Opening tutorial..."));
    assert_eq!(session.recommendation_clicked(2), Some(Section::Community));
    assert_eq!(session.recommendation_clicked(3), Some(Section::Library));
    assert_eq!(session.recommendation_clicked(99), None);
}
