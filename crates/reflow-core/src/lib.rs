//! # State, render loop, effects and context
//!
//! Reflow is a small reactive runtime. Components are render functions from
//! props (captured by the closure) and state (held by the runtime) to a
//! [`View`] description. The runtime keeps one instance per mounted
//! component and re-renders an instance when one of its state cells is set.
//!
//! - [`Cx::use_state`]: positional state cells with a scheduling setter.
//! - [`Cx::use_effect`]: post-commit side effects keyed by a dependency value.
//! - [`Context`] / [`Cx::use_context`]: values broadcast down the tree.
//! - [`Timers`]: intervals and timeouts on a simulated clock.
//!
//! ```rust
//! use reflow_core::*;
//!
//! #[allow(non_snake_case)]
//! fn Counter() -> View {
//!     component("Counter", |cx| {
//!         let count = cx.use_state(|| 0i32);
//!         let inc = count.clone();
//!         Ok(View::new(ViewKind::Column).with_children(vec![
//!             View::new(ViewKind::Text {
//!                 text: format!("Count: {}", count.get()),
//!                 role: TextRole::Body,
//!             }),
//!             View::new(ViewKind::Button {
//!                 text: "Increment".into(),
//!                 on_click: Some(std::rc::Rc::new(move || inc.update(|c| *c += 1))),
//!             }),
//!         ]))
//!     })
//! }
//!
//! let mut root = Root::mount(RuntimeConfig::default(), |_: &Frame| {}, Counter()).unwrap();
//! root.click("Increment").unwrap();
//! root.click("Increment").unwrap();
//! assert!(root.frame().unwrap().root.contains_text("Count: 2"));
//! ```
//!
//! ## Scheduling
//!
//! Setters never render synchronously. They mark the owning instance dirty
//! and [`Root::flush`] renders every dirty instance (shallowest first),
//! commits one [`Frame`] to the [`HostSurface`], and only then runs the
//! effects queued by that pass. [`Root::dispatch`], [`Root::click`] and
//! [`Root::advance`] flush once per event, so several `set` calls inside one
//! handler produce a single render.
//!
//! ## Effects and cleanup
//!
//! ```rust
//! use reflow_core::*;
//!
//! let view = component("Ticker", |cx| {
//!     let timers = cx.timers();
//!     cx.use_effect((), move || {
//!         let handle = timers.set_timeout(std::time::Duration::from_secs(1), || {});
//!         on_unmount(move || handle.cancel())
//!     });
//!     Ok(View::fragment(vec![]))
//! });
//! # let _ = view;
//! ```
//!
//! Cleanups run before the effect re-runs and when the instance unmounts,
//! in reverse declaration order.

pub mod config;
pub mod context;
pub mod effects;
pub mod error;
pub mod hooks;
pub mod runtime;
pub mod state;
pub mod timer;
pub mod view;


pub use config::RuntimeConfig;
pub use context::{Context, ContextId};
pub use effects::{Dispose, on_unmount};
pub use error::{Error, Result};
pub use hooks::Cx;
pub use runtime::{HostSurface, InstanceId, Root};
pub use state::State;
pub use timer::{Fired, TimerHandle, TimerId, Timers};
pub use view::{Callback, ComponentNode, Frame, ProviderNode, TextRole, View, ViewKind, component};
