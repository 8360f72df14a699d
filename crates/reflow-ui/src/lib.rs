#![allow(non_snake_case)]
//! Host widgets and a plain-text painter for committed frames.

pub mod dump;

use std::rc::Rc;

use reflow_core::*;

pub use dump::dump;

pub fn Surface(children: impl IntoChildren) -> View {
    View::new(ViewKind::Surface).with_children(children.into_children())
}

pub fn Column() -> View {
    View::new(ViewKind::Column)
}

pub fn Row() -> View {
    View::new(ViewKind::Row)
}

pub fn Text(text: impl Into<String>) -> View {
    View::new(ViewKind::Text {
        text: text.into(),
        role: TextRole::Body,
    })
}

pub fn Heading(text: impl Into<String>) -> View {
    View::new(ViewKind::Text {
        text: text.into(),
        role: TextRole::Heading,
    })
}

pub fn ErrorText(text: impl Into<String>) -> View {
    View::new(ViewKind::Text {
        text: text.into(),
        role: TextRole::Error,
    })
}

pub fn Button(text: impl Into<String>, on_click: impl Fn() + 'static) -> View {
    View::new(ViewKind::Button {
        text: text.into(),
        on_click: Some(Rc::new(on_click)),
    })
}

/// Button with no handler; pressing it does nothing.
pub fn InertButton(text: impl Into<String>) -> View {
    View::new(ViewKind::Button {
        text: text.into(),
        on_click: None,
    })
}

/// Renders `content` only when `show` holds.
pub fn When(show: bool, content: impl FnOnce() -> View) -> View {
    if show {
        content()
    } else {
        View::fragment(vec![])
    }
}

pub trait ViewExt: Sized {
    fn child(self, children: impl IntoChildren) -> Self;
}

impl ViewExt for View {
    fn child(mut self, children: impl IntoChildren) -> Self {
        self.children.extend(children.into_children());
        self
    }
}

pub trait IntoChildren {
    fn into_children(self) -> Vec<View>;
}

impl IntoChildren for View {
    fn into_children(self) -> Vec<View> {
        vec![self]
    }
}

impl IntoChildren for Vec<View> {
    fn into_children(self) -> Vec<View> {
        self
    }
}

impl<const N: usize> IntoChildren for [View; N] {
    fn into_children(self) -> Vec<View> {
        self.into()
    }
}

impl IntoChildren for Option<View> {
    fn into_children(self) -> Vec<View> {
        self.into_iter().collect()
    }
}

macro_rules! impl_into_children_tuple {
    ($($idx:tt $t:ident),+) => {
        impl<$($t: IntoChildren),+> IntoChildren for ($($t,)+) {
            fn into_children(self) -> Vec<View> {
                let mut v = Vec::new();
                $(v.extend(self.$idx.into_children());)+
                v
            }
        }
    };
}

impl_into_children_tuple!(0 A, 1 B);
impl_into_children_tuple!(0 A, 1 B, 2 C);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
