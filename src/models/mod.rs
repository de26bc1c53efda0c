pub mod playlist;
pub mod user;

pub use playlist::{
    Category, ContainerExtension, ParseOptions, ParsedPlaylist, StreamRecord, DEFAULT_CATEGORY,
    FIRST_STREAM_ID,
};
pub use user::{AuthResult, UserDirectory, UserRecord};
