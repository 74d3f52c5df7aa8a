// Domain layer: models, ports and the pure birthday arithmetic.

pub mod birthday;
pub mod model;
pub mod ports;
