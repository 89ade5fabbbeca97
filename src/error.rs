//! Error taxonomy shared by the engine, the stores and the exporters.
//!
//! Errors fall into three classes:
//!
//! - **client errors** ([`AnnotError::InvalidLocation`],
//!   [`AnnotError::InvalidSearch`], [`AnnotError::UnknownAssembly`],
//!   [`AnnotError::InvalidLevels`], [`AnnotError::Parse`]): rejected before
//!   any store query is issued and never retried;
//! - **store failures** ([`AnnotError::Store`], [`AnnotError::Io`]):
//!   surfaced unchanged to the caller;
//! - **construction failures** ([`AnnotError::Construction`]): malformed
//!   geometry met while building a feature tree.
//!
//! [`AnnotError::Cancelled`] is returned when a caller aborts a running
//! resolution through a [`CancelToken`](crate::annotate::CancelToken).

use thiserror::Error;

use crate::data_structs::typedef::PosType;

#[derive(Error, Debug)]
pub enum AnnotError {
    #[error("invalid location {chr}:{start}-{end}: start is greater than end")]
    InvalidLocation {
        chr:   String,
        start: PosType,
        end:   PosType,
    },
    #[error("{0} is an invalid search term")]
    InvalidSearch(String),
    #[error("unknown assembly: {0}")]
    UnknownAssembly(String),
    #[error("invalid feature levels: {0}")]
    InvalidLevels(String),
    #[error("could not parse {what} from '{value}'")]
    Parse { what: &'static str, value: String },
    #[error("feature store query failed: {0}")]
    Store(#[source] anyhow::Error),
    #[error("malformed {feature} geometry for {id}: {start} > {end}")]
    Construction {
        feature: &'static str,
        id:      String,
        start:   PosType,
        end:     PosType,
    },
    #[error("operation was cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnnotError {
    /// Whether the error was caused by the caller's input rather than by the
    /// store or by malformed annotation data.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnnotError::InvalidLocation { .. }
                | AnnotError::InvalidSearch(_)
                | AnnotError::UnknownAssembly(_)
                | AnnotError::InvalidLevels(_)
                | AnnotError::Parse { .. }
        )
    }

    pub(crate) fn parse(
        what: &'static str,
        value: impl Into<String>,
    ) -> Self {
        AnnotError::Parse {
            what,
            value: value.into(),
        }
    }

    /// Wraps any store-side failure.
    pub fn store<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>, {
        AnnotError::Store(err.into())
    }
}

pub type Result<T> = std::result::Result<T, AnnotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AnnotError::InvalidSearch("a".into()).is_client_error());
        assert!(AnnotError::UnknownAssembly("hg00".into()).is_client_error());
        assert!(AnnotError::InvalidLocation {
            chr:   "chr1".into(),
            start: 10,
            end:   5,
        }
        .is_client_error());
        assert!(!AnnotError::store(anyhow::anyhow!("disk")).is_client_error());
        assert!(!AnnotError::Cancelled.is_client_error());
    }

    #[test]
    fn test_store_error_keeps_message() {
        let err = AnnotError::store(anyhow::anyhow!("connection reset"));
        assert_eq!(
            err.to_string(),
            "feature store query failed: connection reset"
        );
    }
}
