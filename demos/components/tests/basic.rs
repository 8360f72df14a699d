use std::time::Duration;

use components::*;
use reflow_core::{Root, RuntimeConfig, View};
use reflow_platform::HeadlessSurface;

fn mount(view: View) -> (Root, HeadlessSurface) {
    let _ = env_logger::builder().is_test(true).try_init();
    let surface = HeadlessSurface::new();
    let root = Root::mount(RuntimeConfig::default(), surface.clone(), view).unwrap();
    (root, surface)
}

fn texts(root: &Root) -> Vec<String> {
    root.frame().unwrap().root.texts()
}

#[test]
fn test_app_first_frame() {
    let (_root, surface) = mount(App());
    insta::assert_snapshot!(surface.last().unwrap(), @r#"
    Surface #app
      Column
        Heading "React Components Demo"
        Surface #greeting
          Heading "Hello, User!"
        Surface #counter
          Heading "Counter"
          Text "Count: 0"
          Button "Increment"
          Button "Decrement"
        Surface #card
          Heading "Card Component"
          Text "This is a child element passed to the Card component."
          Button "Card Button"
        Surface #toggle
          Heading "Toggle Demo"
          Button "Hide Content"
          Text "This content can be toggled!"
    "#);
}

#[test]
fn test_counter_shows_sum_of_clicks() {
    let runs: [&[i64]; 4] = [&[], &[1, 1, 1], &[-1, -1, 1], &[1, -1, -1, -1, 1, 1, 1]];
    for clicks in runs {
        let (mut root, _) = mount(Counter());
        for step in clicks {
            let label = if *step > 0 { "Increment" } else { "Decrement" };
            root.click(label).unwrap();
        }
        let sum: i64 = clicks.iter().sum();
        assert!(
            texts(&root).contains(&format!("Count: {sum}")),
            "clicks {clicks:?} should show {sum}, got {:?}",
            texts(&root)
        );
    }
}

#[test]
fn test_each_click_commits_one_frame() {
    let (mut root, surface) = mount(Counter());
    root.click("Increment").unwrap();
    root.click("Increment").unwrap();
    assert_eq!(surface.commits(), 3);
}

#[test]
fn test_toggle_hides_then_restores() {
    let (mut root, surface) = mount(ToggleContent());
    root.click("Hide Content").unwrap();
    assert_eq!(texts(&root), vec!["Toggle Demo", "Show Content"]);

    root.click("Show Content").unwrap();
    let history = surface.history();
    assert_eq!(history.first(), history.last());
}

#[test]
fn test_inert_card_button_does_nothing() {
    let (mut root, surface) = mount(App());
    root.click("Card Button").unwrap();
    assert_eq!(surface.commits(), 1);
}

#[test]
fn test_greeting_name_comes_from_config() {
    let config = DemoConfig::from_json(r#"{ "greeting_name": "Ada" }"#).unwrap();
    let (root, _) = mount(with_config(config, App()));
    assert!(root.frame().unwrap().root.contains_text("Hello, Ada!"));
}

#[test]
fn test_config_json_defaults_and_units() {
    assert_eq!(DemoConfig::from_json("{}").unwrap(), DemoConfig::default());

    let config = DemoConfig::from_json(r#"{ "tick_ms": 250, "fetch_delay_ms": 40 }"#).unwrap();
    assert_eq!(config.greeting_name, "User");
    assert_eq!(config.tick, Duration::from_millis(250));
    assert_eq!(config.fetch_delay, Duration::from_millis(40));
}

#[test]
fn test_config_rejects_zero_tick_and_bad_json() {
    assert!(matches!(
        DemoConfig::from_json(r#"{ "tick_ms": 0 }"#),
        Err(ConfigError::ZeroTick)
    ));
    assert!(matches!(
        DemoConfig::from_json(r#"{ "tick_ms": "fast" }"#),
        Err(ConfigError::Parse(_))
    ));
}
