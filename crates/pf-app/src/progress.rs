#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ListingFiles,
    CheckingCache,
    LoadingCachedResult,
    Assembling,
    Deriving,
    DetectingBorders,
    SavingResults,
    Completed,
}

impl PipelineStage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ListingFiles => "listing files",
            Self::CheckingCache => "checking cache",
            Self::LoadingCachedResult => "loading cached result",
            Self::Assembling => "assembling dataset",
            Self::Deriving => "deriving fields",
            Self::DetectingBorders => "detecting borders",
            Self::SavingResults => "saving results",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineProgressEvent {
    pub stage: PipelineStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl PipelineProgressEvent {
    pub fn stage(stage: PipelineStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
