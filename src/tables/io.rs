// src/tables/io.rs
use std::{
    io::{BufWriter, Write},
    path::Path,
    time::Instant,
};

use super::{Accepting, Tables};
use crate::spec::{Anchor, Options};

// -------------------- JSON (de)serialization --------------------

pub fn save_tables_json(path: &Path, t: &Tables) -> std::io::Result<()> {
    // Stream to disk to avoid giant intermediate strings.
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, t)?;
    w.write_all(b"\n")?;
    w.flush()
}

pub fn load_tables_json_bytes(data: &[u8]) -> Result<Tables, String> {
    let t = serde_json::from_slice::<Tables>(data)
        .map_err(|e| format!("Failed to parse tables JSON: {e}"))?;
    check_shape(&t)?;
    Ok(t)
}

// -------------------- Compact binary --------------------
//
//   magic: 8 bytes = "CSLEXT01"
//   u32:   n_states, n_rows, ncols, n_symbols, n_lexical, bol, eof
//   per lexical state: u32 name length, UTF-8 name, i32 start (-1 none)
//   i32:   accept[n_states]   // -1 none, -2 pseudo, else rule
//   u8:    anchor[n_states]
//   u32:   row_map[n_states]
//   u32:   col_map[n_symbols]
//   i32:   next[n_rows * ncols] // -1 error
//
// Options and action code are JSON-only; the binary form carries just the
// automaton.

const BIN_MAGIC: &[u8; 8] = b"CSLEXT01";
const NONE_I32: i32 = -1;
const PSEUDO_I32: i32 = -2;

fn invalid(msg: impl Into<String>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg.into())
}

fn to_i32(v: Option<u32>) -> std::io::Result<i32> {
    match v {
        None => Ok(NONE_I32),
        Some(v) => i32::try_from(v).map_err(|_| invalid("value exceeds i32::MAX")),
    }
}

fn len_u32(n: usize, what: &str) -> std::io::Result<u32> {
    u32::try_from(n).map_err(|_| invalid(format!("{what} exceeds u32::MAX")))
}

pub fn write_tables_bin<W: Write>(w: &mut W, t: &Tables) -> std::io::Result<()> {
    let n_rows = if t.ncols == 0 {
        0
    } else {
        t.next.len() / t.ncols as usize
    };

    // Header
    w.write_all(BIN_MAGIC)?;
    for v in [
        len_u32(t.row_map.len(), "n_states")?,
        len_u32(n_rows, "n_rows")?,
        t.ncols,
        len_u32(t.col_map.len(), "n_symbols")?,
        len_u32(t.states.len(), "n_lexical")?,
        t.bol,
        t.eof,
    ] {
        w.write_all(&v.to_le_bytes())?;
    }

    for (i, name) in t.states.iter().enumerate() {
        w.write_all(&len_u32(name.len(), "state name")?.to_le_bytes())?;
        w.write_all(name.as_bytes())?;
        let start = t.state_dtrans.get(i).copied().flatten();
        w.write_all(&to_i32(start)?.to_le_bytes())?;
    }

    for a in &t.accept {
        let v = match a {
            None => NONE_I32,
            Some(Accepting::Pseudo) => PSEUDO_I32,
            Some(Accepting::Rule(r)) => to_i32(Some(*r))?,
        };
        w.write_all(&v.to_le_bytes())?;
    }
    let anchors: Vec<u8> = t.anchor.iter().map(|a| a.0).collect();
    w.write_all(&anchors)?;

    for &r in &t.row_map {
        w.write_all(&r.to_le_bytes())?;
    }
    for &c in &t.col_map {
        w.write_all(&c.to_le_bytes())?;
    }

    // next: stream in chunks to reduce syscalls
    const CHUNK: usize = 1 << 16;
    let mut bytes = Vec::with_capacity(CHUNK * 4);
    for chunk in t.next.chunks(CHUNK) {
        bytes.clear();
        for &v in chunk {
            bytes.extend_from_slice(&to_i32(v)?.to_le_bytes());
        }
        w.write_all(&bytes)?;
    }
    Ok(())
}

pub fn save_tables_bin(path: &Path, t: &Tables) -> std::io::Result<()> {
    let instant = Instant::now();
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    write_tables_bin(&mut w, t)?;
    let flush = w.flush();
    log::info!(
        "[tables] saved {} in {} ms",
        path.display(),
        instant.elapsed().as_millis()
    );
    flush
}

#[inline]
fn take<'a>(buf: &mut &'a [u8], n: usize) -> Result<&'a [u8], String> {
    if buf.len() < n {
        return Err("truncated tables .bin".into());
    }
    let (head, rest) = buf.split_at(n);
    *buf = rest;
    Ok(head)
}

#[inline]
fn take_u32(buf: &mut &[u8]) -> Result<u32, String> {
    let mut le = [0u8; 4];
    le.copy_from_slice(take(buf, 4)?);
    Ok(u32::from_le_bytes(le))
}

#[inline]
fn take_i32(buf: &mut &[u8]) -> Result<Option<u32>, String> {
    let mut le = [0u8; 4];
    le.copy_from_slice(take(buf, 4)?);
    match i32::from_le_bytes(le) {
        NONE_I32 => Ok(None),
        v if v >= 0 => Ok(Some(v as u32)),
        v => Err(format!("bad table entry {v}")),
    }
}

pub fn load_tables_bin_bytes(mut data: &[u8]) -> Result<Tables, String> {
    if take(&mut data, 8)? != BIN_MAGIC {
        return Err("bad magic in tables .bin".into());
    }
    let n_states = take_u32(&mut data)? as usize;
    let n_rows = take_u32(&mut data)? as usize;
    let ncols = take_u32(&mut data)?;
    let n_symbols = take_u32(&mut data)? as usize;
    let n_lexical = take_u32(&mut data)? as usize;
    let bol = take_u32(&mut data)?;
    let eof = take_u32(&mut data)?;

    let mut states = Vec::with_capacity(n_lexical);
    let mut state_dtrans = Vec::with_capacity(n_lexical);
    for _ in 0..n_lexical {
        let len = take_u32(&mut data)? as usize;
        let name = std::str::from_utf8(take(&mut data, len)?)
            .map_err(|e| format!("bad state name: {e}"))?;
        states.push(name.to_string());
        state_dtrans.push(take_i32(&mut data)?);
    }

    let mut accept = Vec::with_capacity(n_states);
    for _ in 0..n_states {
        let mut le = [0u8; 4];
        le.copy_from_slice(take(&mut data, 4)?);
        accept.push(match i32::from_le_bytes(le) {
            NONE_I32 => None,
            PSEUDO_I32 => Some(Accepting::Pseudo),
            r if r >= 0 => Some(Accepting::Rule(r as u32)),
            r => return Err(format!("bad accept entry {r}")),
        });
    }
    let anchor = take(&mut data, n_states)?
        .iter()
        .map(|&b| Anchor(b))
        .collect();

    let mut row_map = Vec::with_capacity(n_states);
    for _ in 0..n_states {
        row_map.push(take_u32(&mut data)?);
    }
    let mut col_map = Vec::with_capacity(n_symbols);
    for _ in 0..n_symbols {
        col_map.push(take_u32(&mut data)?);
    }

    let cells = n_rows
        .checked_mul(ncols as usize)
        .ok_or("n_rows*ncols overflow")?;
    let mut next = Vec::with_capacity(cells);
    for _ in 0..cells {
        next.push(take_i32(&mut data)?);
    }

    let t = Tables {
        states,
        state_dtrans,
        accept,
        anchor,
        col_map,
        row_map,
        next,
        ncols,
        bol,
        eof,
        options: Options::default(),
        actions: Vec::new(),
        user_code: String::new(),
        class_code: Vec::new(),
        init_code: Vec::new(),
        ctor_code: Vec::new(),
        eof_code: Vec::new(),
    };
    check_shape(&t)?;
    Ok(t)
}

// Cross-checks the table dimensions so lookups cannot index out of range.
fn check_shape(t: &Tables) -> Result<(), String> {
    let n_states = t.row_map.len();
    let ncols = t.ncols as usize;
    let n_rows = if ncols == 0 { 0 } else { t.next.len() / ncols };
    if ncols != 0 && t.next.len() % ncols != 0 {
        return Err("next table is not a whole number of rows".into());
    }
    if t.accept.len() != n_states || t.anchor.len() != n_states {
        return Err("per-state arrays disagree in length".into());
    }
    if t.state_dtrans.len() != t.states.len() {
        return Err("state_dtrans does not match the lexical states".into());
    }
    if t.row_map.iter().any(|&r| r as usize >= n_rows) {
        return Err("row_map entry out of range".into());
    }
    if t.col_map.iter().any(|&c| c >= t.ncols) {
        return Err("col_map entry out of range".into());
    }
    let bad_state = |s: &Option<u32>| s.is_some_and(|s| s as usize >= n_states);
    if t.next.iter().any(bad_state) || t.state_dtrans.iter().any(bad_state) {
        return Err("state index out of range".into());
    }
    Ok(())
}
