//! Theme shared through a required context.

use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

use reflow_core::{Callback, Context, Cx, Result, View, component};
use reflow_ui::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value carried by [`THEME`]: the current theme and a way to flip it.
#[derive(Clone)]
pub struct ThemeState {
    pub theme: Theme,
    toggle: Callback,
}

impl ThemeState {
    pub fn toggle(&self) {
        (self.toggle)()
    }
}

// The toggle always targets the same provider, so only the theme is compared.
impl PartialEq for ThemeState {
    fn eq(&self, other: &Self) -> bool {
        self.theme == other.theme
    }
}

impl fmt::Debug for ThemeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeState")
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

pub static THEME: LazyLock<Context<ThemeState>> =
    LazyLock::new(|| Context::required("ThemeContext"));

/// Owns the theme (initially light) and provides it to `children`.
pub fn ThemeProvider(children: Vec<View>) -> View {
    component("ThemeProvider", move |cx| {
        let theme = cx.use_state(|| Theme::Light);
        let flip = theme.clone();
        let value = ThemeState {
            theme: theme.get(),
            toggle: Rc::new(move || flip.update(|t| *t = t.toggled())),
        };
        Ok(THEME.provide(value, children.clone()))
    })
}

/// Current theme; fails with `MissingProvider` outside a [`ThemeProvider`].
pub fn use_theme(cx: &mut Cx<'_>) -> Result<ThemeState> {
    cx.use_context(&THEME)
}

pub fn ThemedButton() -> View {
    component("ThemedButton", |cx| {
        let state = use_theme(cx)?;
        let label = format!("Toggle Theme ({})", state.theme);
        Ok(Button(label, move || state.toggle()).tag("toggle-theme"))
    })
}

/// Card painted in the current theme; the theme shows up as its tag.
pub fn ThemedCard(title: impl Into<String>, children: Vec<View>) -> View {
    let title = title.into();
    component("ThemedCard", move |cx| {
        let state = use_theme(cx)?;
        Ok(Surface((Heading(title.clone()), children.clone())).tag(format!("theme:{}", state.theme)))
    })
}
