//! The assistant's voice and the per-task model parameters.
//!
//! Every prompt leads with the same persona preamble. The preamble never
//! says what the assistant runs on and never names the backing service;
//! the persona holds even when someone asks directly.

/// Display name used in replies and the gateway banner.
pub const ASSISTANT_NAME: &str = "Ironwren";

/// System preamble injected at the head of every prompt.
pub const PERSONA_PREAMBLE: &str = "You are Ironwren, a sharp and friendly coding assistant living in a chat server. \
Be conversational and keep answers concise unless the question needs depth. \
You are comfortable reviewing, fixing, and generating code in any mainstream language. \
Never mention what you are built on, never name any backing service, and never describe yourself as an AI or a language model. \
If someone asks what you are, you are simply Ironwren.";

/// The kinds of work routed through the provider. Each carries its own
/// token budget and temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Conversational replies with history
    Chat,
    /// Quick summary of an uploaded file
    UploadAnalysis,
    /// Deep review of pasted code
    Analyze,
    /// Rewrite code, pasted or uploaded
    Fix,
    /// Translate code to another language
    Convert,
    /// Android app scaffold walkthrough
    BuildApk,
    /// Static web app scaffold
    BuildWeb,
    /// Generic project scaffold
    BuildProject,
    /// Repository layout and CI starter
    GithubSetup,
}

/// Sampling parameters for one task.
#[derive(Debug, Clone, Copy)]
pub struct TaskParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Task {
    pub fn params(&self) -> TaskParams {
        match self {
            Task::Chat => TaskParams {
                max_tokens: 1000,
                temperature: 0.7,
            },
            Task::UploadAnalysis => TaskParams {
                max_tokens: 150,
                temperature: 0.3,
            },
            Task::Analyze => TaskParams {
                max_tokens: 1500,
                temperature: 0.3,
            },
            Task::Fix => TaskParams {
                max_tokens: 2000,
                temperature: 0.2,
            },
            Task::Convert => TaskParams {
                max_tokens: 2000,
                temperature: 0.3,
            },
            Task::BuildApk => TaskParams {
                max_tokens: 3000,
                temperature: 0.2,
            },
            Task::BuildWeb => TaskParams {
                max_tokens: 2500,
                temperature: 0.3,
            },
            Task::BuildProject => TaskParams {
                max_tokens: 2800,
                temperature: 0.3,
            },
            Task::GithubSetup => TaskParams {
                max_tokens: 2000,
                temperature: 0.2,
            },
        }
    }

    /// Whether this task runs on the fast chat model. Everything else uses
    /// the stronger code model.
    pub fn uses_chat_model(&self) -> bool {
        matches!(self, Task::Chat | Task::UploadAnalysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_never_blows_its_cover() {
        let lower = PERSONA_PREAMBLE.to_lowercase();
        assert!(lower.contains("ironwren"));
        assert!(!lower.contains("groq"));
        assert!(!lower.contains("llama"));
        assert!(!lower.contains("mixtral"));
    }

    #[test]
    fn chat_params_match_defaults() {
        let params = Task::Chat.params();
        assert_eq!(params.max_tokens, 1000);
        assert!((params.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn code_tasks_run_cooler_than_chat() {
        for task in [Task::Analyze, Task::Fix, Task::Convert, Task::BuildApk] {
            assert!(task.params().temperature < Task::Chat.params().temperature);
            assert!(!task.uses_chat_model());
        }
    }
}
