use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn unknown_field(field: impl Into<String>, property: Option<&str>) -> Error {
        Error(
            ErrorKind::UnknownField {
                field: field.into(),
                property: property.map(str::to_string),
            }
            .into(),
        )
    }

    pub fn not_implemented(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::NotImplemented {
                message: message.into(),
            }
            .into(),
        )
    }

    /// Markup or posting data that contradicts itself, detected while
    /// evaluating `operator` (arena node `node`) on document `doc`.
    pub fn index_consistency(
        operator: &'static str,
        node: u32,
        doc: u32,
        message: impl Into<String>,
    ) -> Error {
        Error(
            ErrorKind::IndexConsistency {
                operator,
                node,
                doc,
                message: message.into(),
            }
            .into(),
        )
    }

    /// Attaches the operator, node and document identity to an error raised
    /// underneath an evaluating node.
    ///
    /// Errors that already carry an evaluation context are returned unchanged,
    /// so the innermost node is the one reported.
    pub fn evaluation(operator: &'static str, node: u32, doc: u32, source: Error) -> Error {
        match source.kind() {
            ErrorKind::Evaluation { .. } | ErrorKind::IndexConsistency { .. } => source,
            _ => Error(
                ErrorKind::Evaluation {
                    operator,
                    node,
                    doc,
                    source,
                }
                .into(),
            ),
        }
    }

    /// Failure reported by an index access collaborator.
    pub fn index<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Index {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    /// The document being evaluated when the error was raised, if known.
    pub fn doc(&self) -> Option<u32> {
        match self.kind() {
            ErrorKind::Evaluation { doc, .. } | ErrorKind::IndexConsistency { doc, .. } => {
                Some(*doc)
            }
            _ => None,
        }
    }

    /// The arena node that raised the error, if known.
    pub fn node(&self) -> Option<u32> {
        match self.kind() {
            ErrorKind::Evaluation { node, .. } | ErrorKind::IndexConsistency { node, .. } => {
                Some(*node)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error(
        "unknown field '{field}'{}",
        property.as_deref().map(|p| format!(" (property '{p}')")).unwrap_or_default())]
    UnknownField {
        field: String,
        property: Option<String>,
    },

    #[error("not yet implemented: {message}")]
    NotImplemented { message: String },

    #[error("index consistency error in {operator} (node {node}), document {doc}: {message}")]
    IndexConsistency {
        operator: &'static str,
        node: u32,
        doc: u32,
        message: String,
    },

    #[error("{operator} (node {node}) failed on document {doc}: {source}")]
    Evaluation {
        operator: &'static str,
        node: u32,
        doc: u32,
        source: Error,
    },

    #[error("index access error: {context}")]
    Index {
        context: String,
        source: StdErrorBoxed,
    },

    #[error("IO error for '{context}': {source}'")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}
