// Domain layer - Overlay model, execution rules and errors

pub mod errors;
pub mod model;
pub mod rules;
