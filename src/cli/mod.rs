pub mod args;
pub mod runner;

pub use args::{
    get_log_level_from_verbose, parse_cli, Cli, Commands, PathsArgs, RenderArgs,
};
pub use runner::run;
