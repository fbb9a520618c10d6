use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ApiscanError {
    #[error("No resource files found in {path}")]
    #[diagnostic(code(apiscan::no_files))]
    NoFiles { path: PathBuf },

    #[error("Parse error in {file}: {message}")]
    #[diagnostic(code(apiscan::parse_error))]
    ParseError { file: PathBuf, message: String },

    #[error("Go grammar unavailable: {0}")]
    #[diagnostic(code(apiscan::grammar))]
    Grammar(String),

    #[error("Required {what} not readable: {path}")]
    #[diagnostic(
        code(apiscan::missing_input),
        help("check the [paths] section of .apiscan.toml or the matching CLI flag")
    )]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(apiscan::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(apiscan::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(apiscan::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(apiscan::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    #[diagnostic(code(apiscan::glob))]
    Glob(#[from] globset::Error),
}

pub type Result<T> = std::result::Result<T, ApiscanError>;
