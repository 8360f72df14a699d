use reflow_core::{Dispose, View, component, on_unmount};
use reflow_ui::*;

use crate::config::DEMO_CONFIG;

/// Seconds counter with start/stop and reset. Ticks only while running; the
/// interval is cancelled whenever it stops or the component goes away.
pub fn Timer() -> View {
    component("Timer", |cx| {
        let config = cx.use_context(&DEMO_CONFIG)?;
        let time = cx.use_state(|| 0u64);
        let running = cx.use_state(|| false);
        let is_running = running.get();

        let timers = cx.timers();
        let ticks = time.clone();
        cx.use_effect((is_running, config.tick), move || {
            if !is_running {
                return Dispose::empty();
            }
            match timers.set_interval(config.tick, move || ticks.update(|t| *t += 1)) {
                Ok(handle) => on_unmount(move || handle.cancel()),
                Err(err) => {
                    log::error!("timer not started: {err}");
                    Dispose::empty()
                }
            }
        });

        cx.use_effect((), || {
            log::info!("Timer component mounted");
            on_unmount(|| log::info!("Timer component will unmount"))
        });

        let toggle = running.clone();
        let reset = time.clone();
        Ok(Surface((
            Heading("Timer Demo (Effects)"),
            Text(format!("Time: {} seconds", time.get())),
            Button(if is_running { "Stop" } else { "Start" }, move || {
                toggle.update(|r| *r = !*r)
            })
            .tag("timer-toggle"),
            Button("Reset", move || reset.set(0)).tag("timer-reset"),
        ))
        .tag("timer"))
    })
}
