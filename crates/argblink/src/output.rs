use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use argblink_proto::{Command, Message};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<&'a [u32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    line: String,
    port: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct CommandOutput {
    #[serde(rename = "type")]
    type_code: u8,
    words: usize,
    envelope: String,
}

pub fn print_message(message: &Message, port: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let (name, values) = match message {
                Message::Data { name, values } | Message::SetData { name, values } => {
                    (Some(name.as_str()), Some(values.as_slice()))
                }
                _ => (None, None),
            };
            let text = match message {
                Message::Error { text } => Some(text.as_str()),
                _ => None,
            };
            let out = MessageOutput {
                kind: message.kind(),
                name,
                values,
                text,
                line: message.to_string(),
                port,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "PORT", "LINE"])
                .add_row(vec![
                    message.kind().to_string(),
                    port.to_string(),
                    message.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{port} --> {message}");
        }
        OutputFormat::Raw => {
            println!("{message}");
        }
    }
}

pub fn print_command(command: &Command, format: OutputFormat) {
    let envelope = command.to_string();
    match format {
        OutputFormat::Json => {
            let out = CommandOutput {
                type_code: command.type_code(),
                words: command.words().len(),
                envelope,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "WORDS", "ENVELOPE"])
                .add_row(vec![
                    command.type_code().to_string(),
                    command.words().len().to_string(),
                    envelope,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for word in command.words() {
                println!("{word}");
            }
        }
        OutputFormat::Raw => {
            println!("{envelope}");
        }
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
