//! Simulated asynchronous fetch driven by a timeout.

use std::rc::Rc;

use reflow_core::{View, component, on_unmount};
use reflow_ui::*;
use thiserror::Error;

use crate::config::DEMO_CONFIG;

/// Shown in place of the list whenever the source fails.
pub const FETCH_FAILED: &str = "Failed to fetch users";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub name: String,
}

impl User {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("user source unavailable: {0}")]
pub struct FetchError(pub String);

pub trait UserSource {
    fn fetch_users(&self) -> Result<Vec<User>, FetchError>;
}

/// The fixed three-user directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockUsers;

impl UserSource for MockUsers {
    fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        Ok(vec![
            User::new(1, "John Doe"),
            User::new(2, "Jane Smith"),
            User::new(3, "Bob Johnson"),
        ])
    }
}

/// Shows "Loading users..." until the fetch resolves `fetch_delay` after
/// mount, then the names in source order or [`FETCH_FAILED`].
pub fn UserList(source: Rc<dyn UserSource>) -> View {
    component("UserList", move |cx| {
        let config = cx.use_context(&DEMO_CONFIG)?;
        let users = cx.use_state(Vec::<User>::new);
        let loading = cx.use_state(|| true);
        let error = cx.use_state(|| None::<String>);

        let timers = cx.timers();
        let source = source.clone();
        let (list, pending, failed) = (users.clone(), loading.clone(), error.clone());
        cx.use_effect((), move || {
            timers.set_timeout(config.fetch_delay, move || {
                match source.fetch_users() {
                    Ok(fetched) => {
                        log::debug!("fetched {} users", fetched.len());
                        list.set(fetched);
                    }
                    Err(err) => {
                        log::warn!("{err}");
                        failed.set(Some(FETCH_FAILED.to_string()));
                    }
                }
                pending.set(false);
            });
            on_unmount(|| log::debug!("UserList unmounted"))
        });

        if loading.get() {
            return Ok(Surface(Text("Loading users...")).tag("users"));
        }
        if let Some(message) = error.get() {
            return Ok(Surface(ErrorText(message)).tag("users"));
        }
        let rows: Vec<View> = users.with(|all| {
            all.iter()
                .map(|u| Text(u.name.clone()).key(u.id.to_string()))
                .collect()
        });
        Ok(Surface((Heading("User List (API Effect)"), Column().child(rows))).tag("users"))
    })
}
