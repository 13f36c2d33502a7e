//! Global error type.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("template \"{0}\" is not registered")]
    TemplateNotRegistered(String),

    #[error("failed to fetch template \"{name}\": {source}")]
    Transport {
        name: String,
        source: crate::transport::Error,
    },

    #[error("template \"{name}\" failed to compile: {source}")]
    TemplateCompile {
        name: String,
        source: crate::template::Error,
    },

    #[error("template \"{name}\" failed to render: {source}")]
    Render {
        name: String,
        source: crate::template::Error,
    },

    #[error("http client: {0}")]
    Client(crate::transport::Error),

    #[error("template cache must be created inside a Tokio runtime")]
    NoRuntime,

    #[error("blocking calls need the multi-threaded Tokio runtime, use the async version instead")]
    BlockingInCurrentThread,
}

impl Error {
    /// Name of the template the error is about, if any.
    pub fn template(&self) -> Option<&str> {
        match self {
            Error::TemplateNotRegistered(name)
            | Error::Transport { name, .. }
            | Error::TemplateCompile { name, .. }
            | Error::Render { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_template_name() {
        let err = Error::TemplateNotRegistered("header".into());
        assert_eq!(err.template(), Some("header"));
        assert_eq!(err.to_string(), "template \"header\" is not registered");
        assert_eq!(Error::NoRuntime.template(), None);
    }
}
