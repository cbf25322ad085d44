use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not install the log subscriber")]
    Logging,
    #[display("could not load the build configuration")]
    Config,
    #[display("could not set up the preload store")]
    Setup,
    #[display("could not clear the preload store")]
    Clear,
    #[display("could not copy the preload store into the output directory")]
    CopyTree,
}
