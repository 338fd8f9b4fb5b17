pub mod cli;
pub mod config;
pub mod csharp;
pub mod discover;
pub mod model;
pub mod scan;
pub mod symbols;
pub mod util;

pub use discover::{DiscoveryError, DiscoveryOptions, Discoverer, discover};
pub use model::{ActionModel, AreaModel, ControllerModel, ParameterModel};
