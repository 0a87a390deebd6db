//! listkit replay - runs a JSON scenario through a list container.

use clap::Parser;
use listkit::adapter::{BindRequest, QueuedElementFactory};
use listkit::config::{self, CliOverrides};
use listkit::model::{AppError, ListType};
use listkit::{BoundElement, DiffResult, ListContainer, PipelineOptions, ScrollAlignment, Size};
use serde::Deserialize;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// Replay a list scenario and print one layout per step as JSON lines
#[derive(Parser, Debug)]
#[command(name = "listkit")]
#[command(version)]
#[command(about = "Replay diff and scroll scenarios through the listkit layout core")]
pub struct Args {
    /// Path to the JSON scenario (reads from stdin if not provided)
    pub scenario: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Layout algorithm
    #[arg(long, value_parser = ["single", "waterfall"])]
    pub list_type: Option<String>,

    /// Number of columns for waterfall lists
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub span_count: Option<u16>,

    /// Coalesce binds into one dispatch per layout pass
    #[arg(long)]
    pub batch: bool,

    /// Items kept bound beyond each viewport edge
    #[arg(long)]
    pub preload: Option<usize>,

    /// Leave bind requests pending until a `complete_binds` step
    #[arg(long)]
    pub manual_binds: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            list_type: self.list_type.as_deref().map(|name| match name {
                "waterfall" => ListType::Waterfall,
                _ => ListType::Single,
            }),
            span_count: self.span_count.map(usize::from),
            enable_batch_render: self.batch.then_some(true),
            preload_buffer_count: self.preload,
        }
    }
}

/// Scenario file: a viewport and the steps to replay.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Scenario {
    viewport: Size,
    #[serde(default)]
    initial_scroll_index: Option<usize>,
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Diff(DiffResult),
    ScrollBy {
        delta: f32,
    },
    ScrollTo {
        index: usize,
        #[serde(default)]
        align: ScrollAlignment,
        #[serde(default)]
        offset: f32,
        #[serde(default)]
        smooth: bool,
    },
    Viewport(Size),
    CompleteBinds {
        /// Main-axis size to report for every completed element.
        #[serde(default)]
        measured: Option<f32>,
    },
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let config = {
        let config_file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(config_file)?;
        config::apply_cli_overrides(merged, args.overrides())?
    };

    listkit::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let mut text = String::new();
    match &args.scenario {
        Some(path) => text = std::fs::read_to_string(path)?,
        None => {
            std::io::stdin().read_to_string(&mut text)?;
        }
    }
    let scenario: Scenario = serde_json::from_str(&text)?;

    let mut list = ListContainer::new(1, &config, QueuedElementFactory::new());
    if let Some(index) = scenario.initial_scroll_index {
        list.set_initial_scroll_index(index);
    }
    list.update_viewport(scenario.viewport);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (number, step) in scenario.steps.into_iter().enumerate() {
        run_step(&mut list, step, number)?;
        if !args.manual_binds {
            complete_binds(&mut list, None);
        }
        serde_json::to_writer(&mut out, &list.take_output())?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn run_step(
    list: &mut ListContainer<QueuedElementFactory>,
    step: Step,
    number: usize,
) -> Result<(), AppError> {
    match step {
        Step::Diff(diff) => list.update_data_source(&diff)?,
        Step::ScrollBy { delta } => {
            list.scroll_by(delta);
        }
        Step::ScrollTo {
            index,
            align,
            offset,
            smooth,
        } => {
            if list.scroll_to_position(index, align, offset, smooth).is_none() {
                warn!(step = number, index, "Scroll target out of range");
            }
        }
        Step::Viewport(size) => list.update_viewport(size),
        Step::CompleteBinds { measured } => complete_binds(list, measured),
    }
    Ok(())
}

/// Complete queued bind requests until the factory goes quiet.
///
/// Completions can trigger relayouts that request more elements, so the
/// queue is drained repeatedly.
fn complete_binds(list: &mut ListContainer<QueuedElementFactory>, measured: Option<f32>) {
    loop {
        let pending: Vec<BindRequest> = list.factory_mut().take_pending();
        if pending.is_empty() {
            break;
        }
        for request in pending {
            let id = list.factory_mut().create_element();
            let element = match measured {
                Some(main) => {
                    let viewport = list.layout().base().viewport();
                    let size = if list.layout().orientation().is_vertical() {
                        Size::new(viewport.width, main)
                    } else {
                        Size::new(main, viewport.height)
                    };
                    BoundElement::measured(id, size)
                }
                None => BoundElement::new(id),
            };
            list.on_finish_bind(element, &PipelineOptions::single(request.operation_id));
        }
    }
}
