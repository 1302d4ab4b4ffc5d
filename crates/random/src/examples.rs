//! Template catalog: meeting-flavored records of the kinds a bulk editor
//! typically faces. Each constructor returns a fresh [`RecordTemplate`].

use serde_json::json;

use crate::record::{FieldKind, FieldTemplate, RecordTemplate};
use crate::string::Token;

fn field(key: &str, kind: FieldKind) -> FieldTemplate {
    FieldTemplate::new(key, kind)
}

pub fn token_person() -> Token {
    Token::pick(vec![
        Token::literal("ann"),
        Token::literal("bo"),
        Token::literal("cyd"),
        Token::literal("dee"),
        Token::literal("max"),
        Token::literal("ria"),
    ])
}

pub fn token_email() -> Token {
    Token::list(vec![
        token_person(),
        Token::literal("."),
        Token::repeat(3, 8, Token::char_range(97, 122, None)),
        Token::literal("@example.org"),
    ])
}

pub fn token_site_url() -> Token {
    Token::list(vec![
        Token::literal("https://"),
        Token::repeat(3, 10, Token::char_range(97, 122, None)),
        Token::literal(".meet.example.com"),
    ])
}

pub fn ballot() -> RecordTemplate {
    RecordTemplate::new(vec![
        field(
            "question",
            FieldKind::Str(Token::list(vec![
                Token::literal("Approve item "),
                Token::char_range(65, 90, Some(1)),
                Token::literal("?"),
            ])),
        ),
        field(
            "status",
            FieldKind::Str(Token::pick(vec![
                Token::literal("draft"),
                Token::literal("open"),
                Token::literal("tallying"),
                Token::literal("closed"),
            ])),
        ),
        field("choices", FieldKind::Literal(json!(["yes", "no", "abstain"]))),
        field("allow_abstain", FieldKind::Bool),
        field("votes_cast", FieldKind::Int { min: 0, max: 250 }),
        field(
            "resolution",
            FieldKind::Record(RecordTemplate::new(vec![
                field(
                    "state",
                    FieldKind::Str(Token::pick(vec![
                        Token::literal("pending"),
                        Token::literal("adopted"),
                        Token::literal("rejected"),
                    ])),
                ),
                field("recorded_by", FieldKind::Str(token_person())),
            ])),
        ),
    ])
}

pub fn comment() -> RecordTemplate {
    RecordTemplate::new(vec![
        field("author", FieldKind::Str(token_person())),
        field(
            "body",
            FieldKind::Str(Token::repeat(8, 40, Token::char_range(97, 122, None))),
        ),
        field("pinned", FieldKind::Bool),
        field("likes", FieldKind::Int { min: 0, max: 500 }),
        field(
            "visibility",
            FieldKind::Str(Token::pick(vec![
                Token::literal("everyone"),
                Token::literal("hosts"),
                Token::literal("hidden"),
            ])),
        ),
    ])
}

pub fn meeting() -> RecordTemplate {
    RecordTemplate::new(vec![
        field(
            "title",
            FieldKind::Str(Token::list(vec![
                Token::pick(vec![
                    Token::literal("Weekly"),
                    Token::literal("Quarterly"),
                    Token::literal("Emergency"),
                ]),
                Token::literal(" "),
                Token::pick(vec![
                    Token::literal("sync"),
                    Token::literal("review"),
                    Token::literal("standup"),
                ]),
            ])),
        ),
        field(
            "status",
            FieldKind::Str(Token::pick(vec![
                Token::literal("scheduled"),
                Token::literal("live"),
                Token::literal("ended"),
            ])),
        ),
        field("starts_at", FieldKind::Int { min: 1_700_000_000, max: 1_800_000_000 }),
        field(
            "settings",
            FieldKind::Record(RecordTemplate::new(vec![
                field("mute_on_entry", FieldKind::Bool),
                field("allow_chat", FieldKind::Bool),
                field("lobby", FieldKind::Bool),
            ])),
        ),
    ])
}

pub fn webex_account() -> RecordTemplate {
    RecordTemplate::new(vec![
        field("email", FieldKind::Str(token_email())),
        field("site_url", FieldKind::Str(token_site_url())),
        field("linked", FieldKind::Bool),
        field("capacity", FieldKind::Int { min: 10, max: 1000 }),
    ])
}

pub fn breakout_room() -> RecordTemplate {
    RecordTemplate::new(vec![
        field(
            "name",
            FieldKind::Str(Token::list(vec![
                Token::literal("Room "),
                Token::char_range(65, 90, Some(1)),
            ])),
        ),
        field("capacity", FieldKind::Int { min: 2, max: 50 }),
        field("auto_assign", FieldKind::Bool),
        field("host", FieldKind::Str(token_person())),
    ])
}
