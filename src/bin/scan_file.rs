// src/bin/scan_file.rs
// Runs compiled tables over a text file and prints the matches.
//
//   scan_file <tables.json|tables.bin> <input.txt>

use std::{env, fs};

use anyhow::{Context, Result, anyhow, bail};
use cslex::{
    scan::Scanner,
    tables::{load_tables_bin_bytes, load_tables_json_bytes},
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let [_, tables_path, input_path] = args.as_slice() else {
        bail!("usage: scan_file <tables.json|tables.bin> <input.txt>");
    };

    let bytes = fs::read(tables_path).with_context(|| format!("reading {tables_path}"))?;
    let tables = if tables_path.ends_with(".bin") {
        load_tables_bin_bytes(&bytes)
    } else {
        load_tables_json_bytes(&bytes)
    }
    .map_err(|e| anyhow!("{tables_path}: {e}"))?;

    let text = fs::read_to_string(input_path).with_context(|| format!("reading {input_path}"))?;
    let mut scanner = Scanner::new(&tables, &text);
    let mut count = 0usize;
    while let Some(m) = scanner.next_token()? {
        let line = tables
            .actions
            .get(m.rule as usize)
            .map(|a| a.line.to_string())
            .unwrap_or_else(|| "?".into());
        println!(
            "rule {:>3} (line {line:>4})  @{:<6} {:?}",
            m.rule,
            m.start,
            scanner.text(&m)
        );
        count += 1;
    }
    println!("[scan_file] {count} tokens");
    Ok(())
}
