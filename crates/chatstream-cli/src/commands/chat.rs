//! Chat command: one-shot and interactive turns

use crate::console::CliConsole;
use anyhow::Result;
use chatstream_core::llm::{CompletionProvider, OpenAiProvider};
use chatstream_core::{
    ChatCompletionConfigInput, ChatCompletionInput, ChatCompletionOutput, ChatCompletionStreamUseCase,
    ChatCompletionUseCase, ChatError, Config, TokenCounter, TokenEstimator,
};
use chatstream_session::store_from_config;
use colored::*;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Snapshots buffered between the use case and the terminal
const STREAM_BUFFER: usize = 32;

pub struct ChatArgs {
    pub message: Option<String>,
    pub conversation_id: Option<String>,
    pub user_id: String,
    pub stream: bool,
    pub verbose: bool,
}

/// Run the chat command
pub async fn execute(config: &Config, args: ChatArgs) -> Result<()> {
    let console = CliConsole::new(args.verbose);
    let mut session = ChatSession::new(config, &args)?;

    match args.message {
        Some(message) => {
            session.turn(&console, message).await?;
            console.success(&format!("Conversation: {}", session.conversation_id));
            Ok(())
        }
        None => session.interactive(&console).await,
    }
}

/// A chat bound to one conversation id across turns
struct ChatSession {
    streaming: ChatCompletionStreamUseCase,
    blocking: ChatCompletionUseCase,
    stream: bool,
    conversation_id: String,
    user_id: String,
    input_config: ChatCompletionConfigInput,
}

impl ChatSession {
    fn new(config: &Config, args: &ChatArgs) -> Result<Self> {
        let store = store_from_config(&config.storage)?;
        let provider: Arc<dyn CompletionProvider> =
            Arc::new(OpenAiProvider::new(config.provider.clone())?);
        let counter: Arc<dyn TokenCounter> = Arc::new(TokenEstimator::new());

        Ok(Self {
            streaming: ChatCompletionStreamUseCase::new(
                store.clone(),
                provider.clone(),
                counter.clone(),
            ),
            blocking: ChatCompletionUseCase::new(store, provider, counter),
            stream: args.stream,
            conversation_id: args.conversation_id.clone().unwrap_or_default(),
            user_id: args.user_id.clone(),
            input_config: config.model.to_input_config(),
        })
    }

    /// Read messages from stdin until EOF or `exit`
    async fn interactive(&mut self, console: &CliConsole) -> Result<()> {
        console.print_header("chatstream");
        println!("{}", "Type a message, or 'exit' to quit. Ctrl-C cancels a reply.".dimmed());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            console.prompt("you>");
            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            let message = line.trim();
            if message.is_empty() {
                continue;
            }
            if matches!(message, "exit" | "quit") {
                break;
            }

            let first_turn = self.conversation_id.is_empty();
            match self.turn(console, message.to_string()).await {
                Ok(()) if first_turn => {
                    console.info(&format!("Conversation: {}", self.conversation_id));
                }
                Ok(()) => {}
                Err(e) => console.error(&e.to_string()),
            }
        }

        if !self.conversation_id.is_empty() {
            console.success(&format!("Conversation: {}", self.conversation_id));
        }
        Ok(())
    }

    /// Run one turn; a cancelled turn is reported but not an error
    async fn turn(&mut self, console: &CliConsole, message: String) -> Result<()> {
        let input = ChatCompletionInput {
            conversation_id: self.conversation_id.clone(),
            user_id: self.user_id.clone(),
            user_message: message,
            config: self.input_config.clone(),
        };

        let cancel = CancellationToken::new();
        let watcher = spawn_ctrl_c_watcher(cancel.clone());

        let result = if self.stream {
            self.stream_turn(input, cancel).await
        } else {
            self.blocking.execute(input, cancel).await.map(|output| {
                println!("{}", output.content);
                output
            })
        };
        watcher.abort();

        match result {
            Ok(output) => {
                self.conversation_id = output.conversation_id;
                Ok(())
            }
            Err(e) if e.is_cancelled() => {
                console.warn("Reply cancelled; nothing was saved for this turn");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn stream_turn(
        &self,
        input: ChatCompletionInput,
        cancel: CancellationToken,
    ) -> Result<ChatCompletionOutput, ChatError> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let (result, printed) = tokio::join!(
            self.streaming.execute(input, tx, cancel),
            print_snapshots(rx)
        );
        if printed > 0 {
            println!();
        }
        result
    }
}

/// Cancel the token on the next Ctrl-C
fn spawn_ctrl_c_watcher(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("ctrl-c received, cancelling turn");
            cancel.cancel();
        }
    })
}

/// Print the newly grown part of each snapshot; returns bytes printed
async fn print_snapshots(mut rx: mpsc::Receiver<ChatCompletionOutput>) -> usize {
    let mut printed = 0;
    let mut stdout = io::stdout();
    while let Some(snapshot) = rx.recv().await {
        let suffix = new_suffix(&snapshot.content, printed);
        print!("{}", suffix);
        let _ = stdout.flush();
        printed += suffix.len();
    }
    printed
}

/// The part of `content` past the first `printed` bytes
fn new_suffix(content: &str, printed: usize) -> &str {
    content.get(printed..).unwrap_or_default()
}
