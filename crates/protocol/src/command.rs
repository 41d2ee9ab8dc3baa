//! Command text encoding and parsing.
//!
//! A command is a name followed by options:
//!
//! ```text
//! <name> --<key1> '<escaped1>' --<key2> '<escaped2>' ...
//! ```
//!
//! Commands are:
//! - **Validated locally**: names and option keys are `_` or `a-z` only, and
//!   a malformed command never reaches the channel
//! - **Escaped, not filtered**: option values may contain anything; `\`
//!   becomes `\\` and `'` becomes `\'`
//! - **Ordered**: options are encoded in insertion order

use smallvec::SmallVec;

use grnbind_core::{Error, Result};

/// Options are few per command; keep them inline.
type OptionList = SmallVec<[(String, String); 8]>;

/// A command with its positional arguments and named options.
///
/// # Example
///
/// ```
/// use grnbind_protocol::Command;
///
/// let cmd = Command::new("table_create")
///     .option("name", "Users")
///     .option("flags", "TABLE_HASH_KEY");
/// assert_eq!(
///     cmd.encode().unwrap(),
///     "table_create --name 'Users' --flags 'TABLE_HASH_KEY'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<String>,
    options: OptionList,
}

impl Command {
    /// Create a command with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            options: OptionList::new(),
        }
    }

    /// Add (or replace) a named option.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_option(key, value);
        self
    }

    /// Add (or replace) a named option in place.
    ///
    /// Replacing keeps the original position of the key.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.options.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.options.push((key, value)),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Command name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positional arguments in order
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Named options in insertion order
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of a named option
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check if a named option is present
    pub fn has_option(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Encode to command text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the name or any option key is empty or
    /// contains anything other than `_` and lowercase ASCII letters.
    pub fn encode(&self) -> Result<String> {
        validate_identifier("command", &self.name)?;
        let mut text = self.name.clone();
        for arg in &self.args {
            text.push_str(" '");
            text.push_str(&escape_value(arg));
            text.push('\'');
        }
        for (key, value) in &self.options {
            validate_identifier("option", key)?;
            text.push_str(" --");
            text.push_str(key);
            text.push_str(" '");
            text.push_str(&escape_value(value));
            text.push('\'');
        }
        Ok(text)
    }

    /// Parse command text.
    ///
    /// Accepts bare words, single- or double-quoted tokens with backslash
    /// escapes, `--key value` options and positional arguments. The name and
    /// option keys follow the same rules as [`Command::encode`].
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(text)?;
        let mut tokens = tokens.into_iter();
        let name = match tokens.next() {
            Some(Token { text, .. }) => text,
            None => return Err(Error::protocol("empty command")),
        };
        validate_identifier("command", &name)?;

        let mut command = Command::new(name);
        while let Some(token) = tokens.next() {
            match token.text.strip_prefix("--") {
                Some(key) if !token.quoted => {
                    validate_identifier("option", key)?;
                    let value = tokens.next().ok_or_else(|| {
                        Error::protocol(format!("missing value: key = <{}>", key))
                    })?;
                    command.set_option(key, value.text);
                }
                _ => command.args.push(token.text),
            }
        }
        Ok(command)
    }
}

/// Escape an option value for single-quoted encoding.
///
/// Every `\` becomes `\\` and every `'` becomes `\'`; nothing else changes.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Validate a command name or option key.
///
/// `what` names the identifier in the error message ("command", "option").
pub fn validate_identifier(what: &str, ident: &str) -> Result<()> {
    if ident.is_empty() || !ident.chars().all(|c| c == '_' || c.is_ascii_lowercase()) {
        return Err(Error::protocol(format!("invalid {}: <{}>", what, ident)));
    }
    Ok(())
}

struct Token {
    text: String,
    quoted: bool,
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };
        if first == '\'' || first == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some(escaped) => value.push(escaped),
                        None => break,
                    },
                    c if c == first => {
                        closed = true;
                        break;
                    }
                    c => value.push(c),
                }
            }
            if !closed {
                return Err(Error::protocol("unterminated quoted value"));
            }
            tokens.push(Token {
                text: value,
                quoted: true,
            });
        } else {
            let mut value = String::new();
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                value.push(c);
            }
            tokens.push(Token {
                text: value,
                quoted: false,
            });
        }
    }
    Ok(tokens)
}
