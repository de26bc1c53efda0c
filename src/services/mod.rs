pub mod auth;
pub mod m3u_parser;
pub mod metrics;
pub mod upstream;
pub mod xtream;
