// Domain layer: book values and the ports (interfaces) the core talks through.

pub mod model;
pub mod ports;
