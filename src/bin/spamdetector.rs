use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use chain_hash::HashMap;
use chain_hash::HashSet;
use clap::Parser;
use thiserror::Error;

/// Scores a message against a database of weighted phrases and reports
/// whether the accumulated score reaches the spam threshold.
#[derive(Parser, Debug)]
#[command(name = "spamdetector")]
struct Args {
    /// Path to the phrase database: one `<phrase>,<score>` per line.
    database: PathBuf,
    /// Path to the message file to classify.
    message: PathBuf,
    /// Score at or above which the message is reported as SPAM.
    threshold: f64,
}

/// Any malformed input: unreadable files, a bad database line, or a
/// non-positive threshold.
#[derive(Debug, Error)]
#[error("Invalid input")]
struct InvalidInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Spam,
    NotSpam,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Spam => f.write_str("SPAM"),
            Verdict::NotSpam => f.write_str("NOT_SPAM"),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(verdict) => {
            println!("{verdict}");
            ExitCode::SUCCESS
        }
        Err(InvalidInput) => {
            eprintln!("Invalid input");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Verdict, InvalidInput> {
    if args.threshold <= 0.0 {
        return Err(InvalidInput);
    }

    let database = fs::read(&args.database).map_err(|_| InvalidInput)?;
    let message = fs::read(&args.message).map_err(|_| InvalidInput)?;

    let (scores, lengths) = parse_database(&database)?;
    let total = score_message(&message, &scores, &lengths);
    Ok(classify(total, args.threshold))
}

/// Loads the phrase database.
///
/// Each line is `<phrase>,<score>`: a non-empty phrase without commas,
/// then one or more ASCII digits, then at most one `\r`. Phrases are
/// lowercased on load and a repeated phrase keeps its last score. One empty
/// line is tolerated at EOF, nowhere else. The distinct phrase lengths come
/// back alongside the scores to bound the scan windows.
fn parse_database(bytes: &[u8]) -> Result<(HashMap<Vec<u8>, u64>, HashSet<usize>), InvalidInput> {
    let mut scores = HashMap::new();
    let mut lengths = HashSet::new();

    let lines: Vec<&[u8]> = bytes.split(|&b| b == b'\n').collect();
    for (index, &line) in lines.iter().enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if line.is_empty() {
            if index + 1 == lines.len() {
                break;
            }
            return Err(InvalidInput);
        }

        let comma = line.iter().position(|&b| b == b',').ok_or(InvalidInput)?;
        let (phrase, rest) = line.split_at(comma);
        let digits = &rest[1..];
        if phrase.is_empty() || digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(InvalidInput);
        }

        let score: u64 = std::str::from_utf8(digits)
            .map_err(|_| InvalidInput)?
            .parse()
            .map_err(|_| InvalidInput)?;

        let phrase = phrase.to_ascii_lowercase();
        lengths.insert(phrase.len());
        *scores.entry(phrase).or_default() = score;
    }

    Ok((scores, lengths))
}

/// Sums the scores of every matching window of the message.
///
/// The message is lowercased once; for each distinct phrase length, every
/// window of that exact length is looked up byte-for-byte. Overlapping
/// matches all count.
fn score_message(message: &[u8], scores: &HashMap<Vec<u8>, u64>, lengths: &HashSet<usize>) -> u64 {
    let lowered = message.to_ascii_lowercase();

    let mut total = 0u64;
    for &len in lengths.iter() {
        if len > lowered.len() {
            continue;
        }
        for window in lowered.windows(len) {
            if let Some(score) = scores.get(&window.to_vec()) {
                total += score;
            }
        }
    }
    total
}

fn classify(total: u64, threshold: f64) -> Verdict {
    if total as f64 >= threshold {
        Verdict::Spam
    } else {
        Verdict::NotSpam
    }
}
