//! Record templates: schema-shaped random entities for exercising bulk-edit
//! flows. A template fixes the key set; generation fills in values, either
//! independently per record or as a set that agrees everywhere except a
//! chosen list of diverging fields.

use rand::Rng;
use serde_json::{Map, Number, Value};

use crate::string::{random_string, Token};

#[derive(Debug, Clone)]
pub struct RecordTemplate {
    fields: Vec<FieldTemplate>,
}

#[derive(Debug, Clone)]
pub struct FieldTemplate {
    key: String,
    kind: FieldKind,
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A random string from a token pattern.
    Str(Token),
    /// A uniform integer in `min..=max`.
    Int { min: i64, max: i64 },
    Bool,
    /// This exact value, every time.
    Literal(Value),
    /// A nested record.
    Record(RecordTemplate),
    /// An array of `min..=max` strings drawn from `item`.
    StrList { min: usize, max: usize, item: Token },
}

impl FieldTemplate {
    pub fn new(key: &str, kind: FieldKind) -> FieldTemplate {
        FieldTemplate {
            key: key.to_string(),
            kind,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl RecordTemplate {
    pub fn new(fields: Vec<FieldTemplate>) -> RecordTemplate {
        RecordTemplate { fields }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.key.as_str())
    }

    /// Generates one record with every field populated.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Map<String, Value> {
        let mut out = Map::new();
        for field in &self.fields {
            out.insert(field.key.clone(), generate_kind(&field.kind, rng));
        }
        out
    }

    /// Generates `count` records that agree everywhere except the `diverge`
    /// keys, which are re-rolled per record. Consecutive records are kept
    /// distinct at each diverged key, so any two or more records genuinely
    /// disagree there. A `Literal` field cannot diverge; listing one is a
    /// caller mistake and degrades to agreement.
    pub fn generate_set<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        diverge: &[&str],
    ) -> Vec<Map<String, Value>> {
        let base = self.generate(rng);
        let mut out: Vec<Map<String, Value>> = Vec::with_capacity(count);
        for index in 0..count {
            let mut record = base.clone();
            for field in &self.fields {
                if !diverge.contains(&field.key.as_str()) {
                    continue;
                }
                let previous = if index == 0 {
                    None
                } else {
                    out[index - 1].get(&field.key)
                };
                let mut value = generate_kind(&field.kind, rng);
                if let Some(previous) = previous {
                    // Best effort: retry until distinct from the last record.
                    for _ in 0..32 {
                        if value != *previous {
                            break;
                        }
                        value = generate_kind(&field.kind, rng);
                    }
                }
                record.insert(field.key.clone(), value);
            }
            out.push(record);
        }
        out
    }
}

fn generate_kind<R: Rng + ?Sized>(kind: &FieldKind, rng: &mut R) -> Value {
    match kind {
        FieldKind::Str(token) => Value::String(random_string(rng, token)),
        FieldKind::Int { min, max } => {
            let lo = (*min).min(*max);
            let hi = (*min).max(*max);
            Value::Number(Number::from(rng.gen_range(lo..=hi)))
        }
        FieldKind::Bool => Value::Bool(rng.gen_bool(0.5)),
        FieldKind::Literal(value) => value.clone(),
        FieldKind::Record(template) => Value::Object(template.generate(rng)),
        FieldKind::StrList { min, max, item } => {
            let lo = (*min).min(*max);
            let hi = (*min).max(*max);
            let len = rng.gen_range(lo..=hi);
            Value::Array(
                (0..len)
                    .map(|_| Value::String(random_string(rng, item)))
                    .collect(),
            )
        }
    }
}
