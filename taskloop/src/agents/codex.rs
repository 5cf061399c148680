//! OpenAI Codex CLI backend.

use super::{Agent, InvokeRequest};

pub struct CodexAgent;

impl Agent for CodexAgent {
    fn name(&self) -> &'static str {
        "codex"
    }

    fn install_hint(&self) -> &'static str {
        "Is the OpenAI Codex CLI installed?"
    }

    fn argv(&self, request: &InvokeRequest) -> Vec<String> {
        let mut argv = vec!["codex".to_string(), "--json".to_string()];
        if request.yolo {
            argv.push("--yolo".to_string());
        }
        if let Some(paths) = &request.allow_paths {
            for path in paths.split(',') {
                argv.push("--add-dir".to_string());
                argv.push(path.trim().to_string());
            }
        }
        // Codex has no session continuation flag; continue_session is ignored.
        argv.push(request.prompt.clone());
        argv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_the_last_argument() {
        let argv = CodexAgent.argv(&InvokeRequest::new("the prompt"));
        assert_eq!(argv.first().map(String::as_str), Some("codex"));
        assert_eq!(argv.last().map(String::as_str), Some("the prompt"));
    }

    #[test]
    fn allow_paths_become_add_dir_flags() {
        let mut request = InvokeRequest::new("p");
        request.allow_paths = Some("src/,docs/".to_string());
        let argv = CodexAgent.argv(&request);
        let joined = argv.join(" ");
        assert!(joined.contains("--add-dir src/"));
        assert!(joined.contains("--add-dir docs/"));
    }

    #[test]
    fn yolo_flag_is_forwarded() {
        let mut request = InvokeRequest::new("p");
        request.yolo = true;
        assert!(CodexAgent.argv(&request).contains(&"--yolo".to_string()));
    }
}
