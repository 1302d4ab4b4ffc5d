//! Apply one patch across every entity in a JSON file, or inspect the
//! folded view of a selection.

use serde_json::{Map, Value};

use multiedit::{DiffDepth, EditSession, MemoryStore, SessionOptions};
use multiedit_core::{diff, merge, placeholder_view, shallow_diff, Patch};

fn usage() -> &'static str {
    "bulk-patch — fold a set of JSON entities and apply one patch to all of them\n\n\
USAGE:\n\
  bulk-patch <entities.json> [<patch.json>] [--id-field NAME] [--shallow] [--dry-run]\n\n\
  entities.json   JSON array of objects, each carrying the id field\n\
  patch.json      JSON object of field changes; nested objects patch\n\
                  nested records. Omit it to print the folded view of the\n\
                  selection, with \"(Multiple)\" where entities disagree.\n\n\
FLAGS:\n\
  --id-field NAME  field holding each entity's id (default \"id\")\n\
  --shallow        send changed top-level fields whole instead of cutting\n\
                   nested patches\n\
  --dry-run        print the per-entity patches that would be applied,\n\
                   without applying them\n"
}

struct Config {
    entities_path: String,
    patch_path: Option<String>,
    id_field: String,
    shallow: bool,
    dry_run: bool,
}

fn parse_args() -> Result<Config, String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print!("{}", usage());
        std::process::exit(0);
    }

    let mut positional: Vec<String> = Vec::new();
    let mut id_field = "id".to_string();
    let mut shallow = false;
    let mut dry_run = false;

    let mut i = 0usize;
    while i < args.len() {
        let a = args[i].as_str();
        match a {
            "--id-field" => {
                i += 1;
                let v = args.get(i).ok_or("--id-field requires NAME")?;
                id_field = v.to_string();
            }
            "--shallow" => shallow = true,
            "--dry-run" => dry_run = true,
            other if other.starts_with("--") => {
                return Err(format!("Unknown arg: {other}\n\n{}", usage()));
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let entities_path = positional
        .next()
        .ok_or_else(|| format!("missing <entities.json>\n\n{}", usage()))?;
    let patch_path = positional.next();
    if positional.next().is_some() {
        return Err(format!("too many positional arguments\n\n{}", usage()));
    }

    Ok(Config {
        entities_path,
        patch_path,
        id_field,
        shallow,
        dry_run,
    })
}

fn read_json(path: &str) -> Result<Value, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("{path}: {e}"))
}

fn print_pretty(value: &Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn run(cfg: &Config) -> Result<(), String> {
    let records = read_json(&cfg.entities_path)?;
    let records = records
        .as_array()
        .ok_or_else(|| format!("{}: expected a JSON array of objects", cfg.entities_path))?;

    let depth = if cfg.shallow {
        DiffDepth::Shallow
    } else {
        DiffDepth::Deep
    };
    let mut session = EditSession::new(SessionOptions {
        depth,
        id_field: cfg.id_field.clone(),
    });
    session
        .load_values(records)
        .map_err(|e| format!("{}: {e}", cfg.entities_path))?;

    let Some(patch_path) = &cfg.patch_path else {
        return print_pretty(&placeholder_view(session.saved()));
    };
    let patch = Patch::from_value(&read_json(patch_path)?)
        .map_err(|e| format!("{patch_path}: {e}"))?;

    if cfg.dry_run {
        let mut rows = Vec::new();
        for entity in session.originals() {
            let updated = merge(&entity.fields, &patch);
            let entity_patch = match depth {
                DiffDepth::Deep => diff(&entity.fields, &updated),
                DiffDepth::Shallow => shallow_diff(&entity.fields, &updated),
            };
            if let Some(entity_patch) = entity_patch {
                let mut row = Map::new();
                row.insert(cfg.id_field.clone(), entity.id.to_value());
                row.insert("patch".to_string(), entity_patch.to_value());
                rows.push(Value::Object(row));
            }
        }
        return print_pretty(&Value::Array(rows));
    }

    let mut store = MemoryStore::with_entities(session.originals().to_vec());
    session.edit(&patch);
    let report = session.submit(&mut store).map_err(|e| e.to_string())?;
    if !report.fully_applied() {
        let mut lines = Vec::new();
        for (id, err) in &report.failed {
            lines.push(format!("{id}: {err}"));
        }
        return Err(lines.join("\n"));
    }

    let rows: Vec<Value> = session
        .originals()
        .iter()
        .map(|entity| entity.to_value(&cfg.id_field))
        .collect();
    print_pretty(&Value::Array(rows))?;
    eprintln!(
        "updated {}, unchanged {}",
        report.applied.len(),
        report.skipped.len()
    );
    Ok(())
}

fn main() {
    let cfg = match parse_args() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    if let Err(e) = run(&cfg) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
