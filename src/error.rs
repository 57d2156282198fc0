use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid board configuration: {rows}x{cols} with {mines} mines")]
    InvalidConfiguration {
        rows: usize,
        cols: usize,
        mines: usize,
    },
    #[error("statistics file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
