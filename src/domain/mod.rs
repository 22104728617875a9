// Domain layer: build request/log models and the ports the runner talks through.

pub mod model;
pub mod ports;
