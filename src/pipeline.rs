use crate::completion::CompletionClient;
use crate::config::Config;
use crate::context::ExecutionContext;
use crate::credentials::{Credential, CredentialProvider};
use crate::error::HowError;
use crate::history::HistoryRecorder;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::prompt::build_prompt;
use crate::providers::{Clipboard, SystemClipboard};
use crate::render::{copy_best_effort, OutputRenderer, RenderMode};
use crate::sanitize::{sanitize, SanitizedOutput};
use std::io::{self, Write};
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// No spinner, instant output.
    pub silent: bool,
    /// Type the answer out character by character.
    pub typewriter: bool,
}

/// One question in, one rendered and recorded answer out.
///
/// A failed completion returns before anything is rendered or recorded.
pub struct Pipeline<H: HttpClient = ReqwestHttpClient> {
    credentials: CredentialProvider,
    client: CompletionClient<H>,
    renderer: OutputRenderer,
    history: HistoryRecorder,
    clipboard: Box<dyn Clipboard>,
    silent: bool,
}

impl Pipeline<ReqwestHttpClient> {
    pub fn new(config: &Config, options: Options) -> Self {
        Self::with_parts(
            CredentialProvider::new(config),
            CompletionClient::new(config),
            HistoryRecorder::new(config),
            Box::new(SystemClipboard),
            options,
        )
    }
}

impl<H: HttpClient> Pipeline<H> {
    pub fn with_parts(
        credentials: CredentialProvider,
        client: CompletionClient<H>,
        history: HistoryRecorder,
        clipboard: Box<dyn Clipboard>,
        options: Options,
    ) -> Self {
        Self {
            credentials,
            client,
            renderer: OutputRenderer::new(RenderMode::from_flags(options.silent, options.typewriter)),
            history,
            clipboard,
            silent: options.silent,
        }
    }

    /// Answers `question` against the live environment, printing to stdout.
    pub async fn run(&self, question: &str) -> Result<SanitizedOutput, HowError> {
        let context = ExecutionContext::collect();
        info!("Context gathered in {} (shell: {})", context.cwd, context.shell);
        let credential = self.credentials.resolve(false)?;
        self.run_with(question, &context, &credential, &mut io::stdout()).await
    }

    pub async fn run_with<W: Write>(
        &self,
        question: &str,
        context: &ExecutionContext,
        credential: &Credential,
        out: &mut W,
    ) -> Result<SanitizedOutput, HowError> {
        let payload = build_prompt(context, question);
        let raw = self.client.complete(credential, payload, self.silent).await?;

        let output = sanitize(&raw);
        info!("Sanitized response into {} line(s)", output.lines().len());

        self.renderer
            .render_to(output.text(), out)
            .await
            .map_err(HowError::Output)?;
        copy_best_effort(self.clipboard.as_ref(), output.text());
        self.history.record(question, output.lines());

        Ok(output)
    }
}
