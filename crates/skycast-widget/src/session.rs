//! Drives the model: one lookup per user action, rendered to a writer.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::model::{WeatherModel, WidgetState};
use crate::query::Query;
use crate::render;
use crate::service::WeatherService;

pub const PROMPT: &str = "weather> ";

/// How finished lookups are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Rendered state, tagged with the stream it belongs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Weather data (stdout)
    Data(String),
    /// Loading, idle, and error text (stderr in one-shot mode)
    Status(String),
}

impl Rendered {
    pub fn text(&self) -> &str {
        match self {
            Self::Data(s) | Self::Status(s) => s,
        }
    }
}

pub fn render_state(state: &WidgetState, format: OutputFormat) -> Result<Rendered> {
    Ok(match (state, format) {
        (WidgetState::Ready(data), OutputFormat::Json) => {
            Rendered::Data(format!("{}\n", render::to_json(data)?))
        }
        (WidgetState::Ready(_), OutputFormat::Text) => Rendered::Data(render::render(state)),
        _ => Rendered::Status(format!("{}\n", render::render(state))),
    })
}

/// Run a single lookup, passing each rendered state to `emit` as it changes.
/// Returns whether data was shown.
pub async fn lookup_once<F>(
    service: &WeatherService,
    model: &mut WeatherModel,
    query: Query,
    format: OutputFormat,
    mut emit: F,
) -> Result<bool>
where
    F: FnMut(Rendered) -> Result<()>,
{
    model.begin(query.clone());
    if format == OutputFormat::Text {
        emit(render_state(model.state(), format)?)?;
    }

    let result = service.lookup(&query).await;
    model.finish(result);

    emit(render_state(model.state(), format)?)?;
    Ok(model.has_data())
}

/// Read queries line by line until `quit`, `exit`, or end of input.
pub async fn run_interactive<R, W>(
    service: &WeatherService,
    input: R,
    out: &mut W,
    format: OutputFormat,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut model = WeatherModel::new();
    let mut lines = input.lines();

    write!(out, "{}", render_state(model.state(), format)?.text())?;

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        match Query::parse(trimmed) {
            Ok(query) => {
                lookup_once(service, &mut model, query, format, |rendered| {
                    write!(out, "{}", rendered.text())?;
                    out.flush()?;
                    Ok(())
                })
                .await?;
            }
            Err(e) => {
                model.fail(&e);
                write!(out, "{}", render_state(model.state(), format)?.text())?;
            }
        }
    }

    tracing::debug!("Interactive session ended");
    Ok(())
}
