use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error fetching release information: {}", .message)]
    ReleaseFetch { message: String },

    #[error(
        "No matching release asset found for pattern `{}`. Available assets: {}",
        .pattern,
        format_asset_names(.available)
    )]
    NoMatchingAsset {
        pattern: String,
        available: Vec<String>,
    },

    #[error("Error downloading template: {}", .message)]
    Download { message: String },

    #[error("Error extracting template archive `{}`: {}", .archive, .reason)]
    Extraction { archive: String, reason: String },

    #[error("Invalid {} `{}`. Choose from: {}", .kind, .value, .choices.join(", "))]
    InvalidChoice {
        kind: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Directory `{}` already exists", .0)]
    ProjectExists(String),

    #[error("Cannot specify both a project name and --here")]
    ProjectNameConflict,

    #[error("A project name is required unless --here is used")]
    ProjectNameRequired,

    #[error("Required AI tool is missing: {}", .0)]
    MissingAgentTool(String),

    #[error("Selection cancelled")]
    SelectionCancelled,

    #[error("Operation cancelled")]
    OperationCancelled,

    #[error("IO error: {}", _0)]
    Io(#[from] std::io::Error),

    #[error("IO error with {} at path `{}`: {}", .description, .path, .original)]
    PathIo {
        description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error in `{}` translation table: {}", .language, .original)]
    Locale {
        language: String,
        original: serde_yaml::Error,
    },

    #[error("Error building HTTP client: {}", .0)]
    HttpClient(String),
}

fn format_asset_names(names: &[String]) -> String {
    if names.is_empty() {
        "(no assets)".to_string()
    } else {
        names.join(", ")
    }
}

impl Error {
    pub fn release_fetch(message: impl Into<String>) -> Self {
        Self::ReleaseFetch {
            message: message.into(),
        }
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    pub fn extraction(archive: impl Into<String>, reason: impl ToString) -> Self {
        Self::Extraction {
            archive: archive.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_choice(kind: &str, value: &str, choices: &[&str]) -> Self {
        Self::InvalidChoice {
            kind: kind.to_string(),
            value: value.to_string(),
            choices: choices.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn io_error(description: String, path: String, original: std::io::Error) -> Self {
        Self::PathIo {
            description,
            path,
            original,
        }
    }

    /// Whether the error came from the user backing out of a prompt.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::SelectionCancelled | Self::OperationCancelled)
    }
}
