use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required context was read with no enclosing provider.
    #[error("context `{context}` read outside of its provider")]
    MissingProvider { context: &'static str },

    #[error("render did not settle after {passes} passes (state set during render or effect loop?)")]
    RenderLoop { passes: usize },

    #[error("no button labelled `{label}` in the committed frame")]
    NoSuchTarget { label: String },

    #[error("timer period must be non-zero")]
    InvalidTimer,

    #[error("root is not mounted")]
    Unmounted,

    /// Failure raised by a component's own render function.
    #[error("{component}: {message}")]
    Render {
        component: &'static str,
        message: String,
    },
}

impl Error {
    pub fn render(component: &'static str, message: impl Into<String>) -> Self {
        Error::Render {
            component,
            message: message.into(),
        }
    }
}
