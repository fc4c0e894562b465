#![doc = "Street-maintenance priority scoring pipeline"]
mod common;
mod config;
mod crs;
mod geom;
mod io;
mod join;
mod layer;
mod pipeline;
mod score;

pub mod cli;
pub mod commands;

#[doc(inline)]
pub use config::PipelineConfig;

#[doc(inline)]
pub use crs::Crs;

#[doc(inline)]
pub use layer::{AddressLayer, AddressPoint, Coerced, PriorityBand, StreetLayer, StreetSegment};

#[doc(inline)]
pub use pipeline::{score_network, RunSummary};
