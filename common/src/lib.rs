pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/xo.rs"));
}

pub mod config;
pub mod id_generator;
pub mod identifiers;
pub mod logger;
pub mod version;

pub use identifiers::*;
pub use proto::*;
