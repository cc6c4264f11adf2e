//! Left-to-right field cursor over a single modem response line, e.g.
//! `+CLCC: 1,0,2,0,0,"+4512345678",145`.
//!
//! Every extraction advances past the field and its separator. A failed
//! extraction means the line is malformed; callers abort whatever they were
//! building instead of applying a partial result.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// The line carries no `<prefix>:` header.
    MissingPrefix,
    /// No fields left on the line.
    Exhausted,
    /// A quoted string without its closing quote.
    UnterminatedString,
    /// The field does not hold a value of the requested type.
    InvalidField,
    /// More lines, or longer ones, than the reply buffer holds.
    Overflow,
}

#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    cur: Option<&'a str>,
}

impl<'a> Tokenizer<'a> {
    /// Cursor positioned at the very beginning of `line`.
    pub fn new(line: &'a str) -> Self {
        Self { cur: Some(line) }
    }

    /// Cursor positioned right after the `<prefix>:` header of `line`.
    pub fn start(line: &'a str) -> Result<Self, ParseError> {
        let (_, fields) = line.split_once(':').ok_or(ParseError::MissingPrefix)?;
        Ok(Self::new(fields))
    }

    pub fn has_more(&self) -> bool {
        matches!(self.cur, Some(rest) if !rest.is_empty())
    }

    /// The unread part of the line.
    pub fn remaining(&self) -> &'a str {
        self.cur.unwrap_or("")
    }

    pub fn next_int(&mut self) -> Result<i32, ParseError> {
        self.next_token()?
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidField)
    }

    pub fn next_hex_int(&mut self) -> Result<u32, ParseError> {
        let token = self.next_token()?.trim();
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        u32::from_str_radix(digits, 16).map_err(|_| ParseError::InvalidField)
    }

    pub fn next_bool(&mut self) -> Result<bool, ParseError> {
        match self.next_int()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ParseError::InvalidField),
        }
    }

    /// Next field as a string, with surrounding quotes removed when present.
    pub fn next_str(&mut self) -> Result<&'a str, ParseError> {
        self.next_token()
    }

    fn next_token(&mut self) -> Result<&'a str, ParseError> {
        let cur = self.cur.ok_or(ParseError::Exhausted)?.trim_start();

        if let Some(quoted) = cur.strip_prefix('"') {
            let end = quoted.find('"').ok_or(ParseError::UnterminatedString)?;
            let after = &quoted[end + 1..];
            self.cur = after.find(',').map(|i| &after[i + 1..]);
            return Ok(&quoted[..end]);
        }

        match cur.split_once(',') {
            Some((token, rest)) => {
                self.cur = Some(rest);
                Ok(token)
            }
            None => {
                self.cur = None;
                Ok(cur)
            }
        }
    }
}
