//! Random string generation from a small token grammar.

use rand::Rng;

/// A pattern for one random string.
#[derive(Debug, Clone)]
pub enum Token {
    /// Emits exactly this text.
    Literal(String),
    /// Emits one of the options, chosen uniformly.
    Pick(Vec<Token>),
    /// Emits the inner token between `min` and `max` times.
    Repeat {
        min: usize,
        max: usize,
        token: Box<Token>,
    },
    /// Emits `count` random codepoints from `min..=max` (one if `None`).
    /// Codepoints that are not valid chars fall back to U+FFFD.
    CharRange {
        min: u32,
        max: u32,
        count: Option<usize>,
    },
    /// Emits every part in order.
    List(Vec<Token>),
}

impl Token {
    pub fn literal(text: &str) -> Token {
        Token::Literal(text.to_string())
    }

    pub fn pick(options: Vec<Token>) -> Token {
        Token::Pick(options)
    }

    pub fn repeat(min: usize, max: usize, token: Token) -> Token {
        Token::Repeat {
            min,
            max,
            token: Box::new(token),
        }
    }

    pub fn char_range(min: u32, max: u32, count: Option<usize>) -> Token {
        Token::CharRange { min, max, count }
    }

    pub fn list(parts: Vec<Token>) -> Token {
        Token::List(parts)
    }
}

/// Renders `token` with the given RNG. Seed the RNG for reproducible output.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, token: &Token) -> String {
    match token {
        Token::Literal(text) => text.clone(),
        Token::Pick(options) => {
            if options.is_empty() {
                return String::new();
            }
            let index = rng.gen_range(0..options.len());
            random_string(rng, &options[index])
        }
        Token::Repeat { min, max, token } => {
            let lo = (*min).min(*max);
            let hi = (*min).max(*max);
            let times = rng.gen_range(lo..=hi);
            let mut out = String::new();
            for _ in 0..times {
                out.push_str(&random_string(rng, token));
            }
            out
        }
        Token::CharRange { min, max, count } => {
            let lo = (*min).min(*max);
            let hi = (*min).max(*max);
            let times = count.unwrap_or(1);
            let mut out = String::new();
            for _ in 0..times {
                let code = rng.gen_range(lo..=hi);
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            out
        }
        Token::List(parts) => {
            let mut out = String::new();
            for part in parts {
                out.push_str(&random_string(rng, part));
            }
            out
        }
    }
}
