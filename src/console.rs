//! Operator input lines
//!
//! Splits a console line into a command name and its arguments. A quoted
//! token keeps its spaces; the raw remainder after the command name is kept
//! as typed for handlers that want free text.

/// Where an invocation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Server console, full width output
    Console,
    /// Remote operator terminal, narrow output
    Remote,
}

/// A tokenized operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    argv: Vec<String>,
    args: String,
    pub source: CommandSource,
}

impl Invocation {
    /// Tokenize `line`. Returns `None` for a blank line.
    pub fn parse(line: &str, source: CommandSource) -> Option<Self> {
        let line = line.trim();
        let mut argv = Vec::new();
        let mut args = String::new();
        let mut rest = line;

        while let Some((token, remaining)) = next_token(rest) {
            if argv.len() == 1 {
                args = rest.trim_start().to_string();
            }
            argv.push(token);
            rest = remaining;
        }

        if argv.is_empty() {
            return None;
        }
        Some(Self { argv, args, source })
    }

    /// Word count including the command name
    pub fn argc(&self) -> usize {
        self.argv.len()
    }

    /// Word `i`, or the empty string past the end
    pub fn argv(&self, i: usize) -> &str {
        self.argv.get(i).map(String::as_str).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.argv(0)
    }

    /// Everything after the command name, quotes included
    pub fn args(&self) -> &str {
        &self.args
    }
}

fn next_token(input: &str) -> Option<(String, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }

    if let Some(quoted) = input.strip_prefix('"') {
        return match quoted.find('"') {
            Some(end) => Some((quoted[..end].to_string(), &quoted[end + 1..])),
            None => Some((quoted.to_string(), "")),
        };
    }

    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Some((input[..end].to_string(), &input[end..]))
}
