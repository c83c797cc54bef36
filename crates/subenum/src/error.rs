use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    CliUsage(String),
    InvalidDomain(String),
    InvalidPort(String),
    InvalidHttpResponse(String),

    #[from]
    SystemTime(std::time::SystemTimeError),

    #[from]
    File(std::io::Error),

    #[from]
    Reqwest(reqwest::Error),

    #[from]
    Json(serde_json::Error),

    #[from]
    Yaml(serde_yaml::Error),

    #[from]
    Resolve(hickory_resolver::error::ResolveError),

    #[from]
    Tracing(tracing::subscriber::SetGlobalDefaultError),
}

// region:    --- Error Boilerplate

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
