#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Validating,
    Compiling,
    Solving,
    SavingResults,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct StepProgress {
    pub step: usize,
    pub n_steps: usize,
    pub time: f64,
    pub stretch: f64,
    pub iterations: usize,
    pub fraction_complete: f64,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub step: Option<StepProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            step: None,
        }
    }
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::Validating => "validating",
            RunStage::Compiling => "compiling",
            RunStage::Solving => "solving",
            RunStage::SavingResults => "saving",
            RunStage::Completed => "completed",
            RunStage::Failed => "failed",
        }
    }
}
