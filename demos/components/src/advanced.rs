use std::rc::Rc;

use reflow_core::{View, component};
use reflow_ui::*;

use crate::theme::{ThemeProvider, ThemedButton, ThemedCard};
use crate::timer::Timer;
use crate::users::{UserList, UserSource};

/// Theme context, a mountable timer and the user list under one provider.
pub fn ComponentsDemoAdvanced(source: Rc<dyn UserSource>) -> View {
    component("ComponentsDemoAdvanced", move |cx| {
        let show_timer = cx.use_state(|| true);
        let shown = show_timer.get();
        let flip = show_timer.clone();
        Ok(ThemeProvider(vec![Column().child((
            Heading("React Components Demo"),
            ThemedCard(
                "Theme Context Demo",
                vec![
                    Text("This card demonstrates the Context API usage for theming."),
                    ThemedButton(),
                ],
            ),
            Button(if shown { "Unmount Timer" } else { "Mount Timer" }, move || {
                flip.update(|s| *s = !*s)
            })
            .tag("timer-mount"),
            When(shown, Timer),
            UserList(source.clone()),
        ))]))
    })
}
