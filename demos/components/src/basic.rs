//! Props, state, children and conditional rendering.

use reflow_core::{View, component};
use reflow_ui::*;

use crate::config::DEMO_CONFIG;

pub fn Greeting(name: impl Into<String>) -> View {
    let name = name.into();
    component("Greeting", move |_cx| {
        Ok(Surface(Heading(format!("Hello, {name}!"))).tag("greeting"))
    })
}

pub fn Counter() -> View {
    component("Counter", |cx| {
        let count = cx.use_state(|| 0i64);
        let inc = count.clone();
        let dec = count.clone();
        Ok(Surface((
            Heading("Counter"),
            Text(format!("Count: {}", count.get())),
            Button("Increment", move || inc.update(|c| *c += 1)),
            Button("Decrement", move || dec.update(|c| *c -= 1)),
        ))
        .tag("counter"))
    })
}

pub fn Card(title: impl Into<String>, children: Vec<View>) -> View {
    let title = title.into();
    component("Card", move |_cx| {
        Ok(Surface((Heading(title.clone()), children.clone())).tag("card"))
    })
}

pub fn ToggleContent() -> View {
    component("ToggleContent", |cx| {
        let visible = cx.use_state(|| true);
        let flip = visible.clone();
        let shown = visible.get();
        Ok(Surface((
            Heading("Toggle Demo"),
            Button(
                format!("{} Content", if shown { "Hide" } else { "Show" }),
                move || flip.update(|v| *v = !*v),
            ),
            When(shown, || Text("This content can be toggled!")),
        ))
        .tag("toggle"))
    })
}

pub fn ComponentsDemo() -> View {
    component("ComponentsDemo", |cx| {
        let config = cx.use_context(&DEMO_CONFIG)?;
        Ok(Column().child((
            Heading("React Components Demo"),
            Greeting(config.greeting_name),
            Counter(),
            Card(
                "Card Component",
                vec![
                    Text("This is a child element passed to the Card component."),
                    InertButton("Card Button"),
                ],
            ),
            ToggleContent(),
        )))
    })
}

pub fn App() -> View {
    Surface(ComponentsDemo()).tag("app")
}
