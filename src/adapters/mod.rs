// Adapters layer: concrete implementations of the domain ports (HTTP build server, local files).

pub mod http;
pub mod storage;
