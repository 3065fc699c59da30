/// Handles argument parsing and command execution.
pub mod cli;

/// Configuration loading, merging and typed engine options.
pub mod config;

/// Defaults, configuration keys and service names.
pub mod constants;

/// Service lookup for the factories.
pub mod container;

/// Configured template environments and their factory.
pub mod environment;

/// Defines custom error types.
pub mod error;

/// Template extensions: URL helpers, dates and debugging.
pub mod extension;

/// Template search paths and namespaces.
pub mod paths;

/// Template rendering and the renderer factory.
pub mod renderer;

/// Resolution of extension and runtime-loader references.
pub mod resolver;

/// Lazy providers of extension runtimes.
pub mod runtime;
