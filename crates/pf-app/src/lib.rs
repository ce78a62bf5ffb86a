//! Shared application service layer for plumeflow.
//!
//! Centralizes configuration handling, the extraction pipeline and its result
//! cache, CSV export, and deck/simulator batches for the CLI.

pub mod config_service;
pub mod deck_service;
pub mod error;
pub mod export;
pub mod pipeline_service;
pub mod progress;

pub use config_service::{
    DeckSettings, DiameterSweep, ExtractionSettings, PipelineConfig, SimulatorSettings,
    load_config, load_or_default, save_config, validate_config,
};
pub use deck_service::{generate_decks, plan_runs, rerun_specs, runner, simulate};
pub use error::{AppError, AppResult};
pub use export::{borders_to_csv, table_header, table_to_csv};
pub use pipeline_service::{
    BordersResponse, Extraction, ExtractionOptions, ExtractionRequest, ExtractionResponse,
    PipelineTiming, ensure_extraction, ensure_extraction_with_progress, find_collapse_borders,
    find_collapse_borders_with_progress, list_runs, load_run, run_extraction, TOOL_VERSION,
};
pub use progress::{PipelineProgressEvent, PipelineStage};
