use crate::{
    cli::{Commands, RenderArgs},
    config::{load_config_file, settings_from_locator},
    constants::{services, STDIN_INDICATOR},
    container::{Container, Service},
    environment::EnvironmentFactory,
    error::{value_kind, Error, Result},
    renderer::{RendererFactory, TemplateRenderer},
};
use log::{debug, info};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Runs the selected command.
pub fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Render(args) => Runner::new(args.config.as_deref())?.render(&args),
        Commands::Paths(args) => Runner::new(args.config.as_deref())?.paths(),
    }
}

/// Wires configuration into a service container and drives the factories.
pub struct Runner {
    container: Container,
}

impl Runner {
    /// Registers the configuration file, if any, as the `config` service.
    pub fn new(config: Option<&Path>) -> Result<Self> {
        let mut container = Container::new();
        if let Some(path) = config {
            container.set(services::CONFIG, Service::Config(load_config_file(path)?));
        }
        Ok(Self { container })
    }

    /// Renders a template and prints it to stdout.
    pub fn render(mut self, args: &RenderArgs) -> Result<()> {
        let environment = EnvironmentFactory::create(&self.container)?;
        self.container.set(services::ENVIRONMENT, Service::Environment(environment));
        let renderer = RendererFactory::create(&self.container)?;

        let params = match args.context.as_deref() {
            Some(STDIN_INDICATOR) => {
                debug!("Reading template parameters from stdin");
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                parse_params(&buf)?
            }
            Some(context) => parse_params(context)?,
            None => Value::Null,
        };

        info!("Rendering '{}'", args.template);
        print!("{}", renderer.render(&args.template, &params)?);
        Ok(())
    }

    /// Prints one configured template directory per line.
    pub fn paths(self) -> Result<()> {
        let settings = settings_from_locator(&self.container)?;
        for path in &settings.paths {
            println!("{path}");
        }
        Ok(())
    }
}

/// Parses template parameters given as a JSON object.
fn parse_params(raw: &str) -> Result<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Object(_) | Value::Null => Ok(value),
        other => Err(Error::InvalidParamsKind { kind: value_kind(&other).to_string() }),
    }
}
