pub mod board;
pub mod complexes;
pub mod config;
pub mod download;
pub mod feeds;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod predictions;
pub mod realtime;
pub mod refresh;
pub mod static_data;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
