//! Command line parsing and interactive run planning.
//!
//! A run needs an engine selection plus at least one source of terms. When
//! the flags do not add up to that, the CLI falls back to a guided prompt
//! session on stdin. Both paths produce the same [`RunPlan`].

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::dork::ParamMap;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Interactive Google and DuckDuckGo dorking to CSV",
    long_about = None
)]
pub struct Args {
    /// Engine to run the generated queries against
    #[arg(long, value_enum)]
    pub engine: Option<EngineChoice>,

    /// Comma-separated dork parameters (e.g., site,intext,intitle)
    #[arg(long)]
    pub params: Option<String>,

    /// Term pairs like site=a.com,b.com intext=password phrase=exact text
    #[arg(long, num_args = 0..)]
    pub terms: Vec<String>,

    /// Output CSV path
    #[arg(long, default_value = "results.csv")]
    pub out: PathBuf,

    /// Run the browser headless
    #[arg(long)]
    pub headless: bool,

    /// Combine across params (Cartesian product)
    #[arg(long)]
    pub combine: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineChoice {
    Google,
    Duckduckgo,
    Both,
}

impl EngineChoice {
    /// Registry names this choice expands to, in run order.
    #[must_use]
    pub fn engine_names(self) -> Vec<&'static str> {
        match self {
            Self::Google => vec!["google"],
            Self::Duckduckgo => vec!["duckduckgo"],
            Self::Both => vec!["google", "duckduckgo"],
        }
    }
}

/// Fully resolved inputs for one harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub engines: Vec<&'static str>,
    pub params_to_terms: ParamMap,
    pub combine: bool,
    pub headless: bool,
    pub out: PathBuf,
}

impl Args {
    /// Resolve a run plan from the flags, or walk the operator through the
    /// interactive prompts when the flags are incomplete. Interactive runs
    /// use the default output path and a headed browser.
    pub fn into_plan(self) -> io::Result<RunPlan> {
        if let Some(plan) = self.flag_plan() {
            return Ok(plan);
        }
        println!("Entering interactive mode...\n");
        let stdin = io::stdin();
        let mut input = stdin.lock();
        collect_interactively(&mut input)
    }

    /// A complete flag plan needs an engine and at least one of
    /// `--params` / `--terms`.
    fn flag_plan(&self) -> Option<RunPlan> {
        let engine = self.engine?;
        let has_params = self.params.as_deref().is_some_and(|p| !p.is_empty());
        if !has_params && self.terms.is_empty() {
            return None;
        }

        let mut map: ParamMap = Vec::new();
        if let Some(params) = &self.params {
            for param in params.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                entry(&mut map, param);
            }
        }
        merge_terms(&mut map, &self.terms);

        Some(RunPlan {
            engines: engine.engine_names(),
            params_to_terms: map,
            combine: self.combine,
            headless: self.headless,
            out: self.out.clone(),
        })
    }
}

/// Slot for `key` in the ordered map, created at the end on first use.
fn entry<'a>(map: &'a mut ParamMap, key: &str) -> &'a mut Vec<String> {
    let index = match map.iter().position(|(param, _)| param == key) {
        Some(index) => index,
        None => {
            map.push((key.to_string(), Vec::new()));
            map.len() - 1
        }
    };
    &mut map[index].1
}

/// Fold `key=v1,v2` specs into the map. Specs without `=`, with an empty
/// key, or with no usable values are skipped; repeated keys accumulate.
fn merge_terms(map: &mut ParamMap, specs: &[String]) {
    for spec in specs {
        let Some((key, values)) = spec.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let values: Vec<String> = split_list(values);
        if values.is_empty() {
            continue;
        }
        entry(map, key).extend(values);
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Guided prompt session. Generic over the reader so tests can feed scripted
/// answers through a cursor.
fn collect_interactively<R: BufRead>(input: &mut R) -> io::Result<RunPlan> {
    let engines = loop {
        let answer = prompt(input, "Choose engine [google/duckduckgo/both]: ")?;
        match answer.trim().to_lowercase().as_str() {
            "google" => break vec!["google"],
            "duckduckgo" => break vec!["duckduckgo"],
            "both" => break vec!["google", "duckduckgo"],
            _ => {}
        }
    };

    let mut params = prompt_list(
        input,
        "Enter dork parameters (comma-separated, e.g. site,intext,intitle): ",
    )?;
    if params.is_empty() {
        println!(
            "No parameters provided. You can also use 'phrase' for exact quotes or leave blank for raw keywords."
        );
        params = prompt_list(input, "Enter dork parameters (or leave blank): ")?;
    }

    let mut map: ParamMap = Vec::new();
    for param in &params {
        let terms = prompt_list(input, &format!("Enter terms for \"{param}\" (comma-separated): "))?;
        entry(&mut map, param).extend(terms);
    }

    let raw_terms = prompt_list(
        input,
        "Any raw keywords (no param, comma-separated)? (optional): ",
    )?;
    if !raw_terms.is_empty() {
        entry(&mut map, "").extend(raw_terms);
    }

    let combine_answer = prompt(input, "Combine across params (Cartesian product)? [y/N]: ")?;
    let combine = matches!(combine_answer.trim().to_lowercase().as_str(), "y" | "yes");

    Ok(RunPlan {
        engines,
        params_to_terms: map,
        combine,
        headless: false,
        out: PathBuf::from("results.csv"),
    })
}

fn prompt<R: BufRead>(input: &mut R, message: &str) -> io::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed during interactive setup",
        ));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_list<R: BufRead>(input: &mut R, message: &str) -> io::Result<Vec<String>> {
    Ok(split_list(&prompt(input, message)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pairs(entries: &[(&str, &[&str])]) -> ParamMap {
        entries
            .iter()
            .map(|(param, terms)| {
                (
                    (*param).to_string(),
                    terms.iter().map(|t| (*t).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_flags_build_a_complete_plan() {
        let args = Args::parse_from([
            "dorkharvest",
            "--engine",
            "google",
            "--params",
            "site,intext",
            "--terms",
            "site=a.com,b.com",
            "intext=password",
            "--combine",
            "--headless",
            "--out",
            "found.csv",
        ]);
        let plan = args.flag_plan().unwrap();
        assert_eq!(plan.engines, vec!["google"]);
        assert_eq!(
            plan.params_to_terms,
            pairs(&[("site", &["a.com", "b.com"]), ("intext", &["password"])])
        );
        assert!(plan.combine);
        assert!(plan.headless);
        assert_eq!(plan.out, PathBuf::from("found.csv"));
    }

    #[test]
    fn test_both_expands_to_google_then_duckduckgo() {
        let args = Args::parse_from(["dorkharvest", "--engine", "both", "--params", "site"]);
        let plan = args.flag_plan().unwrap();
        assert_eq!(plan.engines, vec!["google", "duckduckgo"]);
        // Params without terms still seed ordered empty slots.
        assert_eq!(plan.params_to_terms, pairs(&[("site", &[])]));
    }

    #[test]
    fn test_missing_engine_defers_to_interactive() {
        let args = Args::parse_from(["dorkharvest", "--params", "site"]);
        assert!(args.flag_plan().is_none());
    }

    #[test]
    fn test_engine_without_params_or_terms_defers_to_interactive() {
        let args = Args::parse_from(["dorkharvest", "--engine", "google"]);
        assert!(args.flag_plan().is_none());
        // An explicitly empty params string counts as absent.
        let args = Args::parse_from(["dorkharvest", "--engine", "google", "--params", ""]);
        assert!(args.flag_plan().is_none());
    }

    #[test]
    fn test_terms_alone_are_enough_for_a_flag_plan() {
        let args = Args::parse_from(["dorkharvest", "--engine", "google", "--terms", "site=a.com"]);
        let plan = args.flag_plan().unwrap();
        assert_eq!(plan.params_to_terms, pairs(&[("site", &["a.com"])]));
        assert_eq!(plan.out, PathBuf::from("results.csv"));
    }

    #[test]
    fn test_malformed_term_specs_are_skipped() {
        let args = Args::parse_from([
            "dorkharvest",
            "--engine",
            "google",
            "--terms",
            "no-equals-sign",
            "=keyless",
            "empty=",
            "site=a.com",
        ]);
        let plan = args.flag_plan().unwrap();
        assert_eq!(plan.params_to_terms, pairs(&[("site", &["a.com"])]));
    }

    #[test]
    fn test_repeated_term_keys_accumulate() {
        let args = Args::parse_from([
            "dorkharvest",
            "--engine",
            "google",
            "--terms",
            "site=a.com",
            "site=b.com",
        ]);
        let plan = args.flag_plan().unwrap();
        assert_eq!(plan.params_to_terms, pairs(&[("site", &["a.com", "b.com"])]));
    }

    #[test]
    fn test_params_fix_slot_order_before_terms_arrive() {
        let args = Args::parse_from([
            "dorkharvest",
            "--engine",
            "google",
            "--params",
            "intext,site",
            "--terms",
            "site=a.com",
        ]);
        let plan = args.flag_plan().unwrap();
        assert_eq!(
            plan.params_to_terms,
            pairs(&[("intext", &[]), ("site", &["a.com"])])
        );
    }

    #[test]
    fn test_interactive_engine_prompt_retries_until_valid() {
        let mut input = Cursor::new("gogle\nBOTH\nsite\na.com\n\nn\n");
        let plan = collect_interactively(&mut input).unwrap();
        assert_eq!(plan.engines, vec!["google", "duckduckgo"]);
        assert_eq!(plan.params_to_terms, pairs(&[("site", &["a.com"])]));
        assert!(!plan.combine);
        assert!(!plan.headless);
        assert_eq!(plan.out, PathBuf::from("results.csv"));
    }

    #[test]
    fn test_interactive_blank_params_get_one_retry_and_raw_keywords() {
        let mut input = Cursor::new("google\n\nsite\nexample.com\nbackup.sql, admin\nY\n");
        let plan = collect_interactively(&mut input).unwrap();
        assert_eq!(
            plan.params_to_terms,
            pairs(&[("site", &["example.com"]), ("", &["backup.sql", "admin"])])
        );
        assert!(plan.combine);
    }

    #[test]
    fn test_interactive_accepts_fully_blank_setup() {
        // Blank params twice, no raw keywords, default combine.
        let mut input = Cursor::new("duckduckgo\n\n\n\n\n");
        let plan = collect_interactively(&mut input).unwrap();
        assert_eq!(plan.engines, vec!["duckduckgo"]);
        assert!(plan.params_to_terms.is_empty());
        assert!(!plan.combine);
    }

    #[test]
    fn test_interactive_eof_is_an_error() {
        let mut input = Cursor::new("");
        let err = collect_interactively(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_yes_spellings_enable_combine() {
        for answer in ["y\n", "Y\n", "yes\n", "YES\n"] {
            let script = format!("google\nsite\na.com\n\n{answer}");
            let mut input = Cursor::new(script);
            let plan = collect_interactively(&mut input).unwrap();
            assert!(plan.combine, "answer {answer:?} should enable combine");
        }
    }
}
