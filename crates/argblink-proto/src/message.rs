use std::fmt;

const TYPE_INIT: &str = "INIT";
const TYPE_DONE: &str = "DONE";
const TYPE_DATA: &str = "DATA";
const TYPE_SET_DATA: &str = "SET";
const TYPE_ERROR: &str = "ERR";

/// A message received from the microcontroller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Message {
    /// No message has been received yet.
    #[default]
    Null,
    /// The device finished booting.
    Init,
    /// The device completed the last command.
    Done,
    /// The device reported an error.
    Error { text: String },
    /// Named data values reported by the device.
    Data { name: String, values: Vec<u32> },
    /// Named values the device has just set.
    SetData { name: String, values: Vec<u32> },
    /// A line this protocol does not understand.
    Unsupported {
        tag: Option<String>,
        args: Vec<String>,
    },
}

impl Message {
    /// Parse one line received from the device. Never fails.
    ///
    /// Tokens are separated by runs of whitespace. Whitespace at either end
    /// of the line yields an empty first or last token, so `" INIT"` is not
    /// an `INIT` message.
    pub fn parse(line: &str) -> Self {
        let tokens = tokenize(line);
        let (tag, args) = (tokens[0], &tokens[1..]);

        match tag {
            TYPE_INIT => Self::Init,
            TYPE_DONE => Self::Done,
            TYPE_DATA => parse_name_values(TYPE_DATA, args, |name, values| Self::Data {
                name,
                values,
            }),
            TYPE_SET_DATA => parse_name_values(TYPE_SET_DATA, args, |name, values| {
                Self::SetData { name, values }
            }),
            TYPE_ERROR => Self::Error {
                text: args.join(" "),
            },
            other => Self::Unsupported {
                tag: Some(other.to_string()),
                args: args.iter().map(|arg| arg.to_string()).collect(),
            },
        }
    }

    /// Short tag naming the variant, for logs and output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Init => TYPE_INIT,
            Self::Done => TYPE_DONE,
            Self::Error { .. } => TYPE_ERROR,
            Self::Data { .. } => TYPE_DATA,
            Self::SetData { .. } => TYPE_SET_DATA,
            Self::Unsupported { .. } => "UNSUPPORTED",
        }
    }

    /// Whether this message ends a command exchange (`DONE` or `ERR`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }
}

/// Parse an optional line. An absent line yields [`Message::Null`].
pub fn parse_message(line: Option<&str>) -> Message {
    match line {
        Some(line) => Message::parse(line),
        None => Message::Null,
    }
}

impl From<&str> for Message {
    fn from(line: &str) -> Self {
        Self::parse(line)
    }
}

/// Split on whitespace runs. Interior runs collapse; leading and trailing
/// runs leave an empty token behind. Never empty: a blank line is one empty
/// token.
fn tokenize(line: &str) -> Vec<&str> {
    let pieces: Vec<&str> = line.split(is_separator).collect();
    let last = pieces.len() - 1;
    pieces
        .iter()
        .enumerate()
        .filter(|(i, piece)| *i == 0 || *i == last || !piece.is_empty())
        .map(|(_, piece)| *piece)
        .collect()
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// `<TYPE> <name> <u32>...`. Tokens that are not valid `u32` are skipped.
fn parse_name_values(
    tag: &str,
    args: &[&str],
    build: impl FnOnce(String, Vec<u32>) -> Message,
) -> Message {
    let Some((name, rest)) = args.split_first() else {
        return Message::Unsupported {
            tag: Some(tag.to_string()),
            args: Vec::new(),
        };
    };
    let values = rest.iter().filter_map(|arg| arg.parse::<u32>().ok()).collect();
    build(name.to_string(), values)
}

impl fmt::Display for Message {
    /// Renders the message in its wire form. `Null` renders as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Init => f.write_str(TYPE_INIT),
            Self::Done => f.write_str(TYPE_DONE),
            Self::Error { text } if text.is_empty() => f.write_str(TYPE_ERROR),
            Self::Error { text } => write!(f, "{TYPE_ERROR} {text}"),
            Self::Data { name, values } => write_name_values(f, TYPE_DATA, name, values),
            Self::SetData { name, values } => write_name_values(f, TYPE_SET_DATA, name, values),
            Self::Unsupported { tag, args } => {
                let mut tokens = tag.iter().chain(args.iter()).map(String::as_str);
                if let Some(first) = tokens.next() {
                    f.write_str(first)?;
                    for token in tokens {
                        write!(f, " {token}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn write_name_values(
    f: &mut fmt::Formatter<'_>,
    tag: &str,
    name: &str,
    values: &[u32],
) -> fmt::Result {
    write!(f, "{tag} {name}")?;
    for value in values {
        write!(f, " {value}")?;
    }
    Ok(())
}
