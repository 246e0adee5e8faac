//! The player command grammar: dispatch on arity and first token.

/// A parsed player command. Borrowed from the request tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand<'a> {
    /// `look`
    Look,
    /// `look <target>`
    LookAt(&'a str),
    /// `take <target>`
    Take(&'a str),
    /// `go <direction>`
    Go(&'a str),
    /// `use <item> <target>`
    UseOn { item: &'a str, target: &'a str },
    /// `tell <target> <word>`
    Tell { target: &'a str, word: &'a str },
    /// Any other two-token command.
    Verb { verb: &'a str, target: &'a str },
    Unknown,
}

impl<'a> PlayerCommand<'a> {
    #[must_use]
    pub fn parse(tokens: &'a [String]) -> Self {
        let words: Vec<&str> = tokens.iter().map(String::as_str).collect();
        match words[..] {
            ["look"] => Self::Look,
            ["look", target] => Self::LookAt(target),
            ["take", target] => Self::Take(target),
            ["go", direction] => Self::Go(direction),
            ["use", item, target] => Self::UseOn { item, target },
            ["tell", target, word] => Self::Tell { target, word },
            [verb, target] => Self::Verb { verb, target },
            _ => Self::Unknown,
        }
    }
}
