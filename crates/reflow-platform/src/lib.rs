//! Host surfaces. There is no windowing backend: frames are either recorded
//! for inspection or printed through `log`.

use std::cell::RefCell;
use std::rc::Rc;

use reflow_core::{Frame, HostSurface, Root, RuntimeConfig, View};
use reflow_ui::dump;

#[derive(Default)]
struct Recorded {
    commits: usize,
    history: Vec<String>,
}

/// Keeps a text dump of every committed frame. Clones share the record, so
/// a caller can hand one clone to [`Root::mount`] and read from another.
#[derive(Clone, Default)]
pub struct HeadlessSurface {
    inner: Rc<RefCell<Recorded>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commits(&self) -> usize {
        self.inner.borrow().commits
    }

    pub fn last(&self) -> Option<String> {
        self.inner.borrow().history.last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.inner.borrow().history.clone()
    }
}

impl HostSurface for HeadlessSurface {
    fn commit(&mut self, frame: &Frame) {
        let mut rec = self.inner.borrow_mut();
        rec.commits += 1;
        rec.history.push(dump(&frame.root));
    }
}

/// Prints every committed frame at info level.
#[derive(Default)]
pub struct LogSurface {
    label: String,
}

impl LogSurface {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl HostSurface for LogSurface {
    fn commit(&mut self, frame: &Frame) {
        log::info!(
            "[{}] frame #{}\n{}",
            self.label,
            frame.generation,
            dump(&frame.root)
        );
    }
}

/// Mounts `view` on a [`LogSurface`], drives it with `script`, then
/// unmounts.
pub fn run_headless(
    label: &str,
    config: RuntimeConfig,
    view: View,
    script: impl FnOnce(&mut Root) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    log::info!("[{label}] mounting");
    let mut root = Root::mount(config, LogSurface::new(label), view)?;
    let result = script(&mut root);
    root.unmount();
    log::info!("[{label}] unmounted");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflow_core::{TextRole, ViewKind};

    #[test]
    fn test_headless_records_each_commit_and_final_teardown() {
        let surface = HeadlessSurface::new();
        let view = View::new(ViewKind::Text {
            text: "hello".into(),
            role: TextRole::Body,
        });
        let mut root = Root::mount(RuntimeConfig::default(), surface.clone(), view).unwrap();
        assert_eq!(surface.commits(), 1);
        assert_eq!(surface.last().as_deref(), Some("Text \"hello\""));

        root.unmount();
        assert_eq!(surface.commits(), 2);
        assert_eq!(surface.last().as_deref(), Some(""));
    }

    #[test]
    fn test_run_headless_propagates_script_errors() {
        let view = View::fragment(vec![]);
        let err = run_headless("t", RuntimeConfig::default(), view, |root| {
            root.click("nope")?;
            Ok(())
        })
        .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
