use crate::chart::ChartSnapshot;
use serde::Serialize;

/// Element ids the page markup exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Region {
    #[serde(rename = "register-form")]
    RegisterForm,
    #[serde(rename = "register-status")]
    RegisterStatus,
    #[serde(rename = "upload-form")]
    UploadForm,
    #[serde(rename = "result")]
    Result,
    #[serde(rename = "calorieChart")]
    CalorieChart,
}

impl Region {
    pub fn id(self) -> &'static str {
        match self {
            Region::RegisterForm => "register-form",
            Region::RegisterStatus => "register-status",
            Region::UploadForm => "upload-form",
            Region::Result => "result",
            Region::CalorieChart => "calorieChart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderInstruction {
    Text { target: Region, text: String },
    Html { target: Region, html: String },
    Chart { target: Region, chart: ChartSnapshot },
}

impl RenderInstruction {
    pub fn target(&self) -> Region {
        match self {
            RenderInstruction::Text { target, .. }
            | RenderInstruction::Html { target, .. }
            | RenderInstruction::Chart { target, .. } => *target,
        }
    }
}

/// Something the actions draw into.
pub trait Surface {
    fn apply(&mut self, instruction: RenderInstruction);

    fn text(&mut self, target: Region, text: String) {
        self.apply(RenderInstruction::Text { target, text });
    }

    fn html(&mut self, target: Region, html: String) {
        self.apply(RenderInstruction::Html { target, html });
    }
}

/// Collects instructions in order so they can be shipped to the browser.
#[derive(Debug, Default)]
pub struct Recorder {
    instructions: Vec<RenderInstruction>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> &[RenderInstruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<RenderInstruction> {
        self.instructions
    }
}

impl Surface for Recorder {
    fn apply(&mut self, instruction: RenderInstruction) {
        self.instructions.push(instruction);
    }
}
