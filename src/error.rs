use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    ParseFailed(#[from] clap::Error),

    #[error("Option `{}` has a choice set but is not a string option.", .0)]
    ChoicesOnNonString(String),

    #[error("Default `{}` for option `{}` is not in its choice set.", .default, .dest)]
    DefaultOutsideChoices { dest: String, default: String },

    #[error("Unknown option destination: `{}`", .0)]
    UnknownOption(String),

    #[error("Option `{}` does not hold a {} value.", .dest, .expected)]
    WrongKind {
        dest: String,
        expected: &'static str,
    },

    #[error("Error resolving path `{}`: {}", .path, .original)]
    Path {
        path: String,
        original: std::io::Error,
    },
}

impl Error {
    pub fn wrong_kind(dest: &str, expected: &'static str) -> Self {
        Self::WrongKind {
            dest: dest.to_string(),
            expected,
        }
    }

    pub fn path_error(path: String, original: std::io::Error) -> Self {
        Self::Path { path, original }
    }
}
