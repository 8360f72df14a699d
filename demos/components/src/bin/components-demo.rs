use std::rc::Rc;

use components::{App, ComponentsDemoAdvanced, DemoConfig, MockUsers, with_config};
use reflow_core::RuntimeConfig;
use reflow_platform::run_headless;

/// Walks both demo screens headlessly; set `RUST_LOG=info` to see each
/// committed frame.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DemoConfig::default();

    run_headless(
        "components",
        RuntimeConfig::default(),
        with_config(config.clone(), App()),
        |root| {
            root.click("Increment")?;
            root.click("Increment")?;
            root.click("Decrement")?;
            root.click("Hide Content")?;
            root.click("Show Content")?;
            Ok(())
        },
    )?;

    let (tick, fetch_delay) = (config.tick, config.fetch_delay);
    run_headless(
        "advanced",
        RuntimeConfig::default(),
        with_config(config, ComponentsDemoAdvanced(Rc::new(MockUsers))),
        move |root| {
            root.advance(fetch_delay)?;
            root.click("timer-toggle")?;
            root.advance(tick * 3)?;
            root.click("timer-toggle")?;
            root.click("timer-reset")?;
            root.click("toggle-theme")?;
            root.click("timer-mount")?;
            root.advance(tick * 2)?;
            Ok(())
        },
    )
}
