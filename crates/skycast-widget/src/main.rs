use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use skycast_core::Config;
use skycast_weather::TemperatureUnit;
use skycast_widget::session::{self, OutputFormat, Rendered};
use skycast_widget::{Query, WeatherModel, WeatherService};

/// Current weather and a short forecast for a city or your location
#[derive(Parser, Debug)]
#[command(name = "skycast", version)]
struct Cli {
    /// City to look up, e.g. Paris or "Springfield, Illinois"
    city: Vec<String>,

    /// Use your approximate location (from your IP address)
    #[arg(long, conflicts_with_all = ["city", "lat", "lon"])]
    here: bool,

    /// Latitude, used together with --lon
    #[arg(long, requires = "lon", allow_negative_numbers = true, conflicts_with = "city")]
    lat: Option<f64>,

    /// Longitude, used together with --lat
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// auto, celsius, or fahrenheit
    #[arg(long, short)]
    units: Option<TemperatureUnit>,

    /// Forecast days to show, including today
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
    days: Option<u8>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Keep prompting for new lookups
    #[arg(long, short)]
    interactive: bool,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn query(&self) -> Result<Option<Query>> {
        if self.here {
            return Ok(Some(Query::CurrentLocation));
        }
        if let (Some(latitude), Some(longitude)) = (self.lat, self.lon) {
            return Ok(Some(Query::Coordinates {
                latitude,
                longitude,
            }));
        }
        if self.city.is_empty() {
            return Ok(None);
        }
        Ok(Some(Query::parse(&self.city.join(" "))?))
    }

    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("skycast: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (config, validation) = match &cli.config {
        Some(path) => Config::load_validated_from(path)?,
        None => Config::load_validated()?,
    };

    skycast_core::init(&config.logging.level)?;
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let mut service = WeatherService::from_config(&config)?;
    if let Some(unit) = cli.units {
        service.provider_mut().set_unit(unit);
    }
    if let Some(days) = cli.days {
        service.provider_mut().set_forecast_days(days);
    }

    let format = cli.format();

    let query = match cli.query() {
        Ok(q) => q,
        Err(e) => {
            // Blank city on the command line; show it the way the widget would
            let mut model = WeatherModel::new();
            if let Some(app_err) = e.downcast_ref::<skycast_core::AppError>() {
                model.fail(app_err);
                eprint!("{}", session::render_state(model.state(), format)?.text());
                return Ok(ExitCode::FAILURE);
            }
            return Err(e);
        }
    };

    let query = query.or_else(|| {
        if cli.interactive {
            return None;
        }
        config
            .weather
            .default_city
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| Query::City(c.trim().to_string()))
    });

    let mut code = ExitCode::SUCCESS;

    if let Some(query) = query {
        let mut model = WeatherModel::new();
        let ok = session::lookup_once(&service, &mut model, query, format, print_rendered).await?;
        if !ok {
            code = ExitCode::FAILURE;
        }
        if !cli.interactive {
            return Ok(code);
        }
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    session::run_interactive(&service, stdin, &mut stdout, format).await?;

    Ok(code)
}

/// Data to stdout, everything else to stderr.
fn print_rendered(rendered: Rendered) -> Result<()> {
    match rendered {
        Rendered::Data(text) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        Rendered::Status(text) => {
            let mut stderr = std::io::stderr().lock();
            stderr.write_all(text.as_bytes())?;
        }
    }
    Ok(())
}
