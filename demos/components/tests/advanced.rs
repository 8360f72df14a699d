use std::rc::Rc;
use std::time::Duration;

use components::*;
use reflow_core::{Error, Root, RuntimeConfig, View, component};
use reflow_platform::HeadlessSurface;
use reflow_ui::*;

const SECOND: Duration = Duration::from_secs(1);

fn mount(view: View) -> (Root, HeadlessSurface) {
    let _ = env_logger::builder().is_test(true).try_init();
    let surface = HeadlessSurface::new();
    let root = Root::mount(RuntimeConfig::default(), surface.clone(), view).unwrap();
    (root, surface)
}

fn texts(root: &Root) -> Vec<String> {
    root.frame().unwrap().root.texts()
}

fn shows(root: &Root, text: &str) -> bool {
    root.frame().unwrap().root.contains_text(text)
}

struct Offline;

impl UserSource for Offline {
    fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        Err(FetchError("connection refused".into()))
    }
}

#[test]
fn test_timer_counts_ticks_only_while_running() {
    let (mut root, _) = mount(Timer());
    assert!(shows(&root, "Time: 0 seconds"));
    assert_eq!(root.advance(SECOND * 2).unwrap(), 0);

    root.click("timer-toggle").unwrap();
    assert!(shows(&root, "Stop"));
    root.advance(SECOND * 3).unwrap();
    assert!(shows(&root, "Time: 3 seconds"));

    root.click("timer-toggle").unwrap();
    assert_eq!(root.timers().pending(), 0);
    assert_eq!(root.advance(SECOND * 5).unwrap(), 0);
    assert!(shows(&root, "Time: 3 seconds"));
    assert!(shows(&root, "Start"));
}

#[test]
fn test_timer_partial_tick_does_not_count() {
    let (mut root, _) = mount(Timer());
    root.click("timer-toggle").unwrap();
    root.advance(Duration::from_millis(999)).unwrap();
    assert!(shows(&root, "Time: 0 seconds"));
    root.advance(Duration::from_millis(1)).unwrap();
    assert!(shows(&root, "Time: 1 seconds"));
}

#[test]
fn test_timer_reset() {
    let (mut root, _) = mount(Timer());
    root.click("timer-toggle").unwrap();
    root.advance(SECOND * 2).unwrap();
    root.click("timer-reset").unwrap();
    assert!(shows(&root, "Time: 0 seconds"));

    // still running after a reset
    root.advance(SECOND).unwrap();
    assert!(shows(&root, "Time: 1 seconds"));

    root.click("timer-toggle").unwrap();
    root.click("timer-reset").unwrap();
    assert!(shows(&root, "Time: 0 seconds"));
    assert!(shows(&root, "Start"));
}

#[test]
fn test_timer_tick_follows_config() {
    let config = DemoConfig::from_json(r#"{ "tick_ms": 250 }"#).unwrap();
    let (mut root, _) = mount(with_config(config, Timer()));
    root.click("timer-toggle").unwrap();
    assert_eq!(root.advance(SECOND).unwrap(), 4);
    assert!(shows(&root, "Time: 4 seconds"));
}

#[test]
fn test_theme_consumers_agree_after_each_toggle() {
    let (mut root, _) = mount(ThemeProvider(vec![
        ThemedCard("Card", vec![ThemedButton()]),
        ThemedButton(),
    ]));
    let count = |root: &Root, label: &str| texts(root).iter().filter(|t| *t == label).count();
    assert_eq!(count(&root, "Toggle Theme (light)"), 2);

    root.click("toggle-theme").unwrap();
    let frame = &root.frame().unwrap().root;
    assert!(frame.find_tagged("theme:dark").is_some());
    assert!(frame.find_tagged("theme:light").is_none());
    assert_eq!(count(&root, "Toggle Theme (dark)"), 2);

    root.click("toggle-theme").unwrap();
    assert!(root.frame().unwrap().root.find_tagged("theme:light").is_some());
    assert_eq!(count(&root, "Toggle Theme (light)"), 2);
}

#[test]
fn test_theme_outside_provider_is_an_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let err = Root::mount(RuntimeConfig::default(), HeadlessSurface::new(), ThemedButton())
        .err()
        .unwrap();
    assert_eq!(
        err,
        Error::MissingProvider {
            context: "ThemeContext"
        }
    );
}

#[test]
fn test_user_list_loads_after_delay() {
    let (mut root, surface) = mount(UserList(Rc::new(MockUsers)));
    assert_eq!(texts(&root), vec!["Loading users..."]);

    root.advance(Duration::from_millis(999)).unwrap();
    assert_eq!(surface.commits(), 1);

    root.advance(Duration::from_millis(1)).unwrap();
    assert_eq!(surface.commits(), 2);
    assert_eq!(
        texts(&root),
        vec!["User List (API Effect)", "John Doe", "Jane Smith", "Bob Johnson"]
    );
}

#[test]
fn test_user_list_shows_error_when_source_fails() {
    let (mut root, surface) = mount(UserList(Rc::new(Offline)));
    root.advance(SECOND).unwrap();
    assert_eq!(texts(&root), vec![FETCH_FAILED]);
    insta::assert_snapshot!(surface.last().unwrap(), @r#"
    Surface #users
      Error "Failed to fetch users"
    "#);
}

#[allow(non_snake_case)]
fn Removable() -> View {
    component("Removable", |cx| {
        let show = cx.use_state(|| true);
        let hide = show.clone();
        Ok(Column().child((
            Button("hide", move || hide.set(false)),
            When(show.get(), || UserList(Rc::new(MockUsers))),
        )))
    })
}

#[test]
fn test_user_fetch_resolving_after_unmount_is_ignored() {
    let (mut root, surface) = mount(Removable());
    root.advance(Duration::from_millis(500)).unwrap();
    root.click("hide").unwrap();
    assert_eq!(surface.commits(), 2);

    assert_eq!(root.advance(SECOND).unwrap(), 1);
    assert_eq!(surface.commits(), 2);
    assert_eq!(texts(&root), vec!["hide"]);
}

#[test]
fn test_unmounting_running_timer_stops_ticks() {
    let (mut root, _) = mount(ComponentsDemoAdvanced(Rc::new(MockUsers)));
    root.advance(SECOND).unwrap();
    root.click("timer-toggle").unwrap();
    root.advance(SECOND * 2).unwrap();
    assert!(shows(&root, "Time: 2 seconds"));

    root.click("timer-mount").unwrap();
    assert!(!texts(&root).iter().any(|t| t.starts_with("Time:")));
    assert!(shows(&root, "Mount Timer"));
    assert_eq!(root.timers().pending(), 0);
    assert_eq!(root.advance(SECOND * 5).unwrap(), 0);

    // a remounted timer starts from scratch
    root.click("timer-mount").unwrap();
    assert!(shows(&root, "Time: 0 seconds"));
    assert!(shows(&root, "Start"));
}

#[test]
fn test_theme_toggle_keeps_sibling_state() {
    let (mut root, _) = mount(ComponentsDemoAdvanced(Rc::new(MockUsers)));
    assert!(shows(&root, "React Components Demo"));
    root.advance(SECOND).unwrap();
    root.click("timer-toggle").unwrap();
    root.advance(SECOND * 2).unwrap();

    root.click("toggle-theme").unwrap();
    assert!(shows(&root, "Toggle Theme (dark)"));
    assert!(shows(&root, "Time: 2 seconds"));
    assert!(shows(&root, "Jane Smith"));
}
