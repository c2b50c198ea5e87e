//! Interactive chat loop: reads lines, runs turns, handles slash commands.

use std::io::Write;
use std::path::PathBuf;

use futures_util::StreamExt;
use lumen_ai::dispatcher::is_image_request;
use lumen_ai::TurnDispatcher;
use lumen_common::{Attachment, Configuration, History, Message, Personality};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::attachments::load_attachment;

const HELP: &str = "\
Commands:
  /attach <path>        attach a file to the next message
  /personality <name>   professional, friendly, creative, humorous, strict, none
  /temperature <t>      sampling temperature (0.0-2.0)
  /model <id>           switch conversational model
  /reasoning <n|off>    extended reasoning budget, or off
  /instruction [text]   set or clear the custom instruction
  /clear                start a new conversation
  /usage                show token usage
  /quit                 exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Attach(PathBuf),
    Personality(Personality),
    Temperature(f64),
    Model(String),
    Reasoning(Option<u32>),
    Instruction(Option<String>),
    Clear,
    Usage,
    Help,
    Quit,
}

/// Parse a slash command. `None` means the line is a normal message.
pub fn parse_command(line: &str) -> Option<Result<Command, String>> {
    let line = line.trim();
    let rest = line.strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "attach" if !arg.is_empty() => Ok(Command::Attach(PathBuf::from(arg))),
        "attach" => Err("usage: /attach <path>".to_string()),
        "personality" => arg.parse::<Personality>().map(Command::Personality),
        "temperature" => arg
            .parse::<f64>()
            .map(Command::Temperature)
            .map_err(|_| format!("invalid temperature '{arg}'")),
        "model" if !arg.is_empty() => Ok(Command::Model(arg.to_string())),
        "model" => Err("usage: /model <id>".to_string()),
        "reasoning" if arg.eq_ignore_ascii_case("off") => Ok(Command::Reasoning(None)),
        "reasoning" => arg
            .parse::<u32>()
            .map(|budget| Command::Reasoning(Some(budget)))
            .map_err(|_| format!("invalid reasoning budget '{arg}'")),
        "instruction" if arg.is_empty() => Ok(Command::Instruction(None)),
        "instruction" => Ok(Command::Instruction(Some(arg.to_string()))),
        "clear" => Ok(Command::Clear),
        "usage" => Ok(Command::Usage),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '/{other}' (try /help)")),
    };
    Some(command)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Conversation state kept on the client side for replay on reconfigure.
pub struct ChatLoop {
    dispatcher: TurnDispatcher,
    config: Configuration,
    history: History,
    pending: Vec<Attachment>,
}

impl ChatLoop {
    pub fn new(dispatcher: TurnDispatcher) -> Self {
        let config = dispatcher.sessions().config().clone();
        Self {
            dispatcher,
            config,
            history: History::new(),
            pending: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Read stdin until EOF or `/quit`.
    pub async fn run(mut self) -> std::io::Result<()> {
        let mut out = std::io::stdout();
        writeln!(out, "lumen ({}), type /help for commands", self.config.model_id)?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if self.handle_line(&line, &mut out).await? == Flow::Quit {
                break;
            }
        }
        info!(turns = self.history.len() / 2, "chat ended");
        Ok(())
    }

    pub async fn handle_line(&mut self, line: &str, out: &mut impl Write) -> std::io::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        match parse_command(line) {
            None => {
                self.run_turn(line.trim(), out).await?;
                Ok(Flow::Continue)
            }
            Some(Err(msg)) => {
                writeln!(out, "{msg}")?;
                Ok(Flow::Continue)
            }
            Some(Ok(command)) => self.apply(command, out),
        }
    }

    async fn run_turn(&mut self, text: &str, out: &mut impl Write) -> std::io::Result<()> {
        let attachments = std::mem::take(&mut self.pending);
        let mut stream = self.dispatcher.dispatch(text, &attachments);
        let mut reply = String::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    write!(out, "{fragment}")?;
                    out.flush()?;
                    reply.push_str(&fragment);
                }
                Err(e) => {
                    writeln!(out)?;
                    writeln!(out, "error: {e}. Send your message again to retry.")?;
                    return Ok(());
                }
            }
        }
        writeln!(out)?;

        // Image turns never reach the chat session, and a reply without text
        // is not kept by it either, so neither is replayed.
        if !is_image_request(text) && !reply.is_empty() {
            self.history.push(Message::user(text));
            self.history.push(Message::assistant(reply));
        }
        Ok(())
    }

    fn apply(&mut self, command: Command, out: &mut impl Write) -> std::io::Result<Flow> {
        let mut next = self.config.clone();
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(Flow::Continue);
            }
            Command::Usage => {
                let usage = self.dispatcher.usage();
                writeln!(
                    out,
                    "tokens: {} in / {} out ({} reports)",
                    usage.total().input_tokens,
                    usage.total().output_tokens,
                    usage.call_count()
                )?;
                return Ok(Flow::Continue);
            }
            Command::Attach(path) => {
                match load_attachment(&path) {
                    Ok(attachment) => {
                        writeln!(out, "attached {} ({})", path.display(), attachment.mime_type)?;
                        self.pending.push(attachment);
                    }
                    Err(e) => writeln!(out, "cannot attach {}: {e}", path.display())?,
                }
                return Ok(Flow::Continue);
            }
            Command::Clear => {
                self.history.clear();
                self.pending.clear();
            }
            Command::Personality(p) => next.personality = p,
            Command::Temperature(t) => next.temperature = t,
            Command::Model(model) => next.model_id = model,
            Command::Reasoning(budget) => {
                next.extended_reasoning_enabled = budget.is_some();
                next.extended_reasoning_budget = budget;
            }
            Command::Instruction(text) => next.custom_instruction = text,
        }

        let result = self.dispatcher.reconfigure(next, &self.history);
        self.config = self.dispatcher.sessions().config().clone();
        match result {
            Ok(()) => {
                let id = self
                    .dispatcher
                    .sessions()
                    .session_id()
                    .map(|id| id.to_string())
                    .unwrap_or_default();
                writeln!(out, "session rebuilt ({id})")?;
            }
            Err(e) => {
                warn!(error = %e, "reconfigure failed");
                writeln!(out, "could not apply setting: {e}")?;
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests;
