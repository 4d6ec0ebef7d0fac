use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("server is full ({max} clients)")]
    ServerFull { max: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;
