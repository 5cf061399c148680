//! Google Gemini CLI backend.

use super::{Agent, InvokeRequest};

pub struct GeminiAgent;

impl Agent for GeminiAgent {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn install_hint(&self) -> &'static str {
        "Is the Gemini CLI installed?"
    }

    fn argv(&self, request: &InvokeRequest) -> Vec<String> {
        let mut argv = vec![
            "gemini".to_string(),
            "-p".to_string(),
            request.prompt.clone(),
        ];
        if request.yolo {
            argv.push("--yolo".to_string());
        }
        if let Some(paths) = &request.allow_paths {
            // Gemini takes the comma-separated list verbatim.
            argv.push("--include-directories".to_string());
            argv.push(paths.clone());
        }
        argv
    }
}
