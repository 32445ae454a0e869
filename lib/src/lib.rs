//! Build tooling for the engine: portable file utilities, generation of the per-platform build
//! directories and preparation of the data folder.

mod environment;
pub mod data;
pub mod fileutils;
pub mod generator;
pub mod vulkan_sdk;

pub use data::{process_data, DataError, DataPlan, ShaderJob};
pub use environment::Environment;
pub use generator::{host_platforms, BuildType, Generator, GeneratorConfig, GeneratorError, Platform};
pub use vulkan_sdk::{normalize_sdk_layout, SdkError, SdkInfo};
