use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("Json: {}", .0)]
    Json(#[from] serde_json::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("{}", .0)]
    Definition(#[from] fritz_core::definition::DefinitionError),

    #[error("{}", .0)]
    Session(#[from] fritz_core::definition::SessionError),

    #[error("{}", .0)]
    Schema(#[from] fritz_core::schema::SchemaError),

    #[error("{}", .0)]
    Client(#[from] fritz_api_client::ClientError),

    #[error("{}", .0)]
    Adapter(#[from] fritz_core::adapter::AdapterError),

    #[error("Record has {} invalid field(s)", .0)]
    InvalidRecord(usize),
}
