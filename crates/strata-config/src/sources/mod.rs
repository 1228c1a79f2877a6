pub mod cli;
pub mod env;
pub mod map;
pub mod properties;

pub use cli::{
    CommandLineConfiguration, CommandLineOption, CommandLineParser, ParseOutcome, ParsedCommandLine, parse_args,
};
pub use env::{EnvSource, EnvironmentVariables, MapEnv, ProcessEnv};
pub use map::ConfigurationMap;
pub use properties::{ConfigurationProperties, parse_properties};
