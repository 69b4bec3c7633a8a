use std::path::PathBuf;
use thiserror::Error;

use crate::collaborator::TargetTableBoundary;
use crate::params::ParameterKind;

pub type Result<T> = std::result::Result<T, BinningError>;

#[derive(Error, Debug)]
pub enum BinningError {
    /// The caller handed in something no binner can work with: negative
    /// bounds, an inverted range, an unparsable channel group.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Two consecutive target-table boundaries overlap. The upstream pixel log
    /// is inconsistent and the generation is aborted.
    #[error("target table boundaries out of order: {previous} overlaps {next}")]
    OutOfOrder {
        previous: TargetTableBoundary,
        next: TargetTableBoundary,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required parameters: {}", format_kinds(.0))]
    MissingParameters(Vec<ParameterKind>),

    /// Catalog or log-store failure, passed through untouched.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl BinningError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

fn format_kinds(kinds: &[ParameterKind]) -> String {
    kinds
        .iter()
        .copied()
        .map(ParameterKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
