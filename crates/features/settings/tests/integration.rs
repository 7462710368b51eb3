use harbor_commands::{CommandRegistry, CommandRouter, DispatchOutcome};
use harbor_domain::{FeatureFlags, WatchListEntry};
use harbor_kernel::lookup::{CatalogResolver, LookupCandidate, LookupCategory, LookupError, LookupFuture, NameResolver};
use harbor_kernel::output::CapturedOutput;
use harbor_runtime::BackgroundTasks;
use harbor_settings::{ConfigurationStore, SettingsContext, register_commands};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: Arc<ConfigurationStore>,
    router: CommandRouter,
    output: Arc<CapturedOutput>,
    tasks: BackgroundTasks,
}

fn fixture_at(path: &Path, dir: TempDir, resolver: Arc<dyn NameResolver>) -> Fixture {
    let store = Arc::new(ConfigurationStore::open(path).unwrap());
    let tasks = BackgroundTasks::current().expect("inside a runtime");
    let registry = Arc::new(CommandRegistry::new());
    let context = SettingsContext { store: store.clone(), resolver, tasks: tasks.clone() };
    register_commands(&registry, &context).unwrap();

    let output = Arc::new(CapturedOutput::default());
    let router = CommandRouter::new(registry, output.clone());
    Fixture { _dir: dir, store, router, output, tasks }
}

fn worlds() -> Arc<dyn NameResolver> {
    Arc::new(CatalogResolver::new().with(
        LookupCategory::World,
        vec![LookupCandidate::new(73, "Ifrit"), LookupCandidate::new(91, "Ramuh")],
    ))
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harbor.json");
    fixture_at(&path, dir, worlds())
}

#[derive(Debug)]
struct Offline;

impl NameResolver for Offline {
    fn resolve<'a>(&'a self, _: &'a str, _: LookupCategory) -> LookupFuture<'a> {
        Box::pin(async { Err(LookupError::Unavailable { message: "offline".into(), context: None }) })
    }
}

#[tokio::test]
async fn test_mute_then_list_prints_exactly_the_entry() {
    let fx = fixture();

    assert_eq!(fx.router.dispatch("/xlmute ugly word"), DispatchOutcome::Handled);
    assert_eq!(fx.store.snapshot().mute_list(), ["ugly word"]);
    fx.output.take();

    assert_eq!(fx.router.dispatch("/xlmutelist"), DispatchOutcome::Handled);
    assert_eq!(fx.output.messages(), ["\"ugly word\""]);

    let reopened = ConfigurationStore::open(fx.store.path()).unwrap();
    assert_eq!(reopened.snapshot().mute_list(), ["ugly word"]);
}

#[tokio::test]
async fn test_mute_deduplicates_and_unmute_removes_all() {
    let fx = fixture();
    fx.router.dispatch("/xlmute spoiler");
    fx.router.dispatch("/xlmute spoiler");
    assert_eq!(fx.store.snapshot().mute_list(), ["spoiler"]);
    assert!(fx.output.messages().contains(&"\"spoiler\" is already muted.".to_owned()));

    fx.store.mutate(|doc| doc.mute_list_mut().push("spoiler".into())).unwrap();
    fx.router.dispatch("/xlunmute spoiler");
    assert!(fx.store.snapshot().mute_list().is_empty());

    fx.output.take();
    fx.router.dispatch("/xlunmute spoiler");
    assert_eq!(fx.output.messages(), ["\"spoiler\" is not muted."]);
}

#[tokio::test]
async fn test_watch_add_list_remove_round_trip() {
    let fx = fixture();

    assert_eq!(fx.router.dispatch("/xlwatch add ifrit"), DispatchOutcome::Handled);
    fx.tasks.drain().await;
    assert_eq!(fx.store.snapshot().watch_list(), [WatchListEntry::new(73, "Ifrit")]);

    fx.output.take();
    fx.router.dispatch("/xlwatch list");
    assert_eq!(fx.output.messages(), ["Ifrit (73)"]);

    fx.router.dispatch("/xlwatch add Ifrit");
    fx.tasks.drain().await;
    assert_eq!(fx.store.snapshot().watch_list().len(), 1);

    fx.router.dispatch("/xlwatch remove Ifrit");
    assert!(fx.store.snapshot().watch_list().is_empty());
}

#[tokio::test]
async fn test_watch_remove_by_numeric_id() {
    let fx = fixture();
    fx.router.dispatch("/xlwatch add Ramuh");
    fx.tasks.drain().await;

    fx.router.dispatch("/xlwatch remove 91");
    assert!(fx.store.snapshot().watch_list().is_empty());

    fx.output.take();
    fx.router.dispatch("/xlwatch remove Odin");
    fx.tasks.drain().await;
    assert_eq!(fx.output.messages(), ["\"Odin\" is not on the watch list."]);
}

#[tokio::test]
async fn test_watch_remove_resolves_the_query_like_add() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harbor.json");
    let resolver = Arc::new(
        CatalogResolver::new().with(LookupCategory::World, vec![LookupCandidate::new(5, "Great Ifrit")]),
    );
    let fx = fixture_at(&path, dir, resolver);

    fx.router.dispatch("/xlwatch add Ifrit");
    fx.tasks.drain().await;
    assert_eq!(fx.store.snapshot().watch_list(), [WatchListEntry::new(5, "Great Ifrit")]);

    fx.output.take();
    assert_eq!(fx.router.dispatch("/xlwatch remove Ifrit"), DispatchOutcome::Handled);
    fx.tasks.drain().await;
    assert!(fx.store.snapshot().watch_list().is_empty());
    assert_eq!(fx.output.messages(), ["Removed Great Ifrit (5) from the watch list."]);
}

#[tokio::test]
async fn test_watch_subcommands_ignore_case() {
    let fx = fixture();
    fx.router.dispatch("/xlwatch ADD Ramuh");
    fx.tasks.drain().await;
    assert_eq!(fx.store.snapshot().watch_list(), [WatchListEntry::new(91, "Ramuh")]);

    fx.output.take();
    fx.router.dispatch("/xlwatch List");
    assert_eq!(fx.output.messages(), ["Ramuh (91)"]);

    fx.router.dispatch("/xlwatch Remove ramuh");
    assert!(fx.store.snapshot().watch_list().is_empty());
}

#[tokio::test]
async fn test_watch_add_reports_not_found() {
    let fx = fixture();
    fx.router.dispatch("/xlwatch add Atlantis");
    fx.tasks.drain().await;

    assert!(fx.output.messages().contains(&"\"Atlantis\" was not found.".to_owned()));
    assert!(fx.store.snapshot().watch_list.is_none());
}

#[tokio::test]
async fn test_watch_lookup_failure_stays_in_the_task() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harbor.json");
    let fx = fixture_at(&path, dir, Arc::new(Offline));

    assert_eq!(fx.router.dispatch("/xlwatch add Ifrit"), DispatchOutcome::Handled);
    fx.tasks.drain().await;

    assert_eq!(fx.output.errors().len(), 1);
    assert!(fx.output.errors()[0].contains("Could not add \"Ifrit\""));
    assert_eq!(fx.router.dispatch("/xlwatch list"), DispatchOutcome::Handled);
}

#[tokio::test]
async fn test_flags_set_toggle_list_and_setall() {
    let fx = fixture();

    fx.router.dispatch("/xlflags set richpresence");
    fx.router.dispatch("/xlflags toggle RichPresence");
    fx.output.take();
    fx.router.dispatch("/xlflags list");
    assert_eq!(fx.output.messages(), ["No feature flags enabled."]);
    assert_eq!(fx.store.snapshot().feature_flags, FeatureFlags::empty());

    fx.router.dispatch("/xlflags setall");
    fx.output.take();
    fx.router.dispatch("/xlflags list");
    let expected: Vec<_> = FeatureFlags::VARIANTS.iter().map(|(_, name)| (*name).to_owned()).collect();
    assert_eq!(fx.output.messages(), expected);

    fx.router.dispatch("/xlflags unsetall");
    assert!(fx.store.snapshot().feature_flags.is_empty());
}

#[tokio::test]
async fn test_unknown_flag_changes_nothing() {
    let fx = fixture();
    assert_eq!(fx.router.dispatch("/xlflags set Turbo"), DispatchOutcome::Handled);

    assert_eq!(fx.output.errors(), ["Unknown feature flag: Turbo"]);
    assert!(!fx.store.path().exists());
}

#[tokio::test]
async fn test_save_failure_surfaces_as_command_failure() {
    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("later");
    let fx = fixture_at(&parent.join("harbor.json"), dir, worlds());
    std::fs::write(&parent, "").unwrap();

    assert_eq!(fx.router.dispatch("/xlmute anything"), DispatchOutcome::Failed);
    assert_eq!(fx.output.errors(), ["Command failed: /xlmute. Check the log for details."]);
}
