use clap::Parser;
use lumen_common::{Configuration, Personality};

/// Lumen: a streaming terminal chat client for Gemini models.
#[derive(Parser, Debug)]
#[command(name = "lumen", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Conversational model id.
    #[arg(short, long)]
    pub model: Option<String>,

    /// Response tone.
    #[arg(short, long)]
    pub personality: Option<Personality>,

    /// Sampling temperature (0.0-2.0).
    #[arg(short, long)]
    pub temperature: Option<f64>,
}

impl Args {
    /// Apply command-line overrides on top of the configured chat settings.
    pub fn apply(&self, chat: &mut Configuration) {
        if let Some(ref model) = self.model {
            chat.model_id = model.clone();
        }
        if let Some(personality) = self.personality {
            chat.personality = personality;
        }
        if let Some(temperature) = self.temperature {
            chat.temperature = temperature;
        }
    }

    /// `tracing-subscriber` directive: a bare level applies to the lumen crates.
    pub fn log_directive(&self) -> Option<String> {
        self.log_level.as_ref().map(|level| {
            if level.contains('=') {
                level.clone()
            } else {
                format!("lumen={level}")
            }
        })
    }
}

pub fn parse() -> Args {
    Args::parse()
}
