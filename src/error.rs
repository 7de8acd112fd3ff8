use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("article resource {0} is missing or not utf-8")]
    ArticleResource(String),

    #[error("malformed article {name}: {source}")]
    ArticleJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no article matches {0:?}")]
    UnknownArticle(String),

    #[error("line width must be at least 1")]
    InvalidWidth,

    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

pub type Result<T> = std::result::Result<T, Error>;
