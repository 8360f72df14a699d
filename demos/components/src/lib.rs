#![allow(non_snake_case)]
//! Demo component set for the reflow runtime: props, state, children,
//! conditional rendering, effects with cleanup, a required theme context and
//! a simulated fetch.

pub mod advanced;
pub mod basic;
pub mod config;
pub mod theme;
pub mod timer;
pub mod users;

pub use advanced::ComponentsDemoAdvanced;
pub use basic::{App, Card, ComponentsDemo, Counter, Greeting, ToggleContent};
pub use config::{ConfigError, DEMO_CONFIG, DemoConfig, with_config};
pub use theme::{THEME, Theme, ThemeProvider, ThemeState, ThemedButton, ThemedCard, use_theme};
pub use timer::Timer;
pub use users::{FETCH_FAILED, FetchError, MockUsers, User, UserList, UserSource};
