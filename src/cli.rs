// Command-line front end for the meta string codec.
//
// Subcommands encode names, decode payloads and inspect framed records.
// Results go to stdout; diagnostics go to stderr.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::meta::{
    Encoding, EncodingSet, MetaString, MetaStringDecoder, MetaStringEncoder, MetaStringError,
    SpecialChars, bits, read_meta_string, wire,
};

const DEFAULT_SPECIAL1: char = '.';
const DEFAULT_SPECIAL2: char = '_';

// ---------------------------------------------------------------------------
// Hex helpers
// ---------------------------------------------------------------------------

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Bytes given on the command line as hex.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HexBytes(Vec<u8>);

fn parse_hex_arg(s: &str) -> Result<HexBytes, String> {
    parse_hex(s).map(HexBytes)
}

fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    let s: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(&s);
    if !s.is_ascii() {
        return Err(format!("hex string '{s}' contains non-ASCII characters"));
    }
    let digits = s.as_bytes();
    if !digits.len().is_multiple_of(2) {
        return Err(format!("hex string '{s}' has odd length"));
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = hex_digit(pair[0]);
            let lo = hex_digit(pair[1]);
            hi.zip(lo).map(|(hi, lo)| (hi << 4) | lo).ok_or_else(|| {
                format!(
                    "invalid hex '{}{}'",
                    char::from(pair[0]),
                    char::from(pair[1])
                )
            })
        })
        .collect()
}

fn hex_digit(b: u8) -> Option<u8> {
    char::from(b).to_digit(16).map(|d| d as u8)
}

fn parse_encoding(s: &str) -> Result<Encoding, String> {
    s.parse::<Encoding>().map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Compact encoder/decoder for identifier-like meta strings.
#[derive(Parser, Debug)]
#[command(
    name = "metastring",
    version,
    about = "Meta string encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Print results as JSON.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode names with the cheapest capable encoding.
    Encode(EncodeArgs),
    /// Decode a hex payload.
    Decode(DecodeArgs),
    /// Parse framed records (tag, specials, length-prefixed payload).
    Inspect(InspectArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug, Clone, Copy)]
struct SpecialArgs {
    /// First special character admitted into the packed alphabets.
    #[arg(long = "special1", default_value_t = DEFAULT_SPECIAL1)]
    special1: char,

    /// Second special character admitted into the packed alphabets.
    #[arg(long = "special2", default_value_t = DEFAULT_SPECIAL2)]
    special2: char,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Names to encode (default: one per line from --input or stdin).
    names: Vec<String>,

    /// Read names from a file, one per line.
    #[arg(long, value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    #[command(flatten)]
    specials: SpecialArgs,

    /// Force a specific encoding instead of selecting one.
    #[arg(long, value_parser = parse_encoding, conflicts_with = "lossless")]
    encoding: Option<Encoding>,

    /// Never fold case away (excludes ALL_TO_LOWER_SPECIAL).
    #[arg(long)]
    lossless: bool,

    /// Print the framed record instead of the bare payload.
    #[arg(long)]
    framed: bool,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Encoding of the payload (e.g. lower-special, utf-8).
    #[arg(long, short = 'e', value_parser = parse_encoding)]
    encoding: Encoding,

    #[command(flatten)]
    specials: SpecialArgs,

    /// Payload as hex (may be empty).
    #[arg(value_parser = parse_hex_arg)]
    payload: HexBytes,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// One or more concatenated framed records, as hex.
    #[arg(value_parser = parse_hex_arg)]
    records: HexBytes,
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Command {
    Encode {
        names: Vec<String>,
        input_file: Option<PathBuf>,
        encoding: Option<Encoding>,
        allowed: EncodingSet,
        framed: bool,
    },
    Decode {
        encoding: Encoding,
        payload: Vec<u8>,
    },
    Inspect {
        records: Vec<u8>,
    },
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    special1: char,
    special2: char,
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let (command, specials) = match cli.command {
        Cmd::Encode(args) => (
            Command::Encode {
                names: args.names,
                input_file: args.input,
                encoding: args.encoding,
                allowed: if args.lossless {
                    EncodingSet::lossless()
                } else {
                    EncodingSet::default()
                },
                framed: args.framed,
            },
            Some(args.specials),
        ),
        Cmd::Decode(args) => (
            Command::Decode {
                encoding: args.encoding,
                payload: args.payload.0,
            },
            Some(args.specials),
        ),
        Cmd::Inspect(args) => (
            Command::Inspect {
                records: args.records.0,
            },
            None,
        ),
        Cmd::Config => (Command::Config, None),
    };
    let specials = specials.unwrap_or(SpecialArgs {
        special1: DEFAULT_SPECIAL1,
        special2: DEFAULT_SPECIAL2,
    });
    Options {
        command,
        special1: specials.special1,
        special2: specials.special2,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("metastring".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

fn specials(opts: &Options) -> Result<SpecialChars, MetaStringError> {
    SpecialChars::new(opts.special1, opts.special2)
}

fn print_json(value: &serde_json::Value) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{s}");
            0
        }
        Err(e) => {
            eprintln!("metastring: JSON output error: {e}");
            1
        }
    }
}

fn meta_json(ms: &MetaString) -> serde_json::Value {
    serde_json::json!({
        "input": ms.input_string(),
        "encoding": ms.encoding().name(),
        "tag": ms.encoding().tag(),
        "special_char1": char::from(ms.special_char1()).to_string(),
        "special_char2": char::from(ms.special_char2()).to_string(),
        "strip_last_char": ms.strip_last_char(),
        "encoded_len": ms.encoded_bytes().len(),
        "encoded_hex": to_hex(ms.encoded_bytes()),
        "framed_hex": to_hex(&wire::to_bytes(ms)),
    })
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("metastring version {version} (Rust)");

    let parallel = cfg!(feature = "parallel") as u8;
    eprintln!("PARALLEL={parallel}");
    eprintln!("MAX_INPUT_LEN={}", crate::meta::MAX_INPUT_LEN);
    eprintln!("DEFAULT_SPECIAL1={DEFAULT_SPECIAL1}");
    eprintln!("DEFAULT_SPECIAL2={DEFAULT_SPECIAL2}");
    for encoding in Encoding::ALL {
        let bits = encoding
            .bits_per_char()
            .map_or_else(|| "raw".to_string(), |b| b.to_string());
        eprintln!("{}={:#04x} bits={bits}", encoding.name(), encoding.tag());
    }

    0
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn read_names(path: Option<&PathBuf>) -> io::Result<Vec<String>> {
    let text = match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut lines = Vec::new();
            for line in io::stdin().lock().lines() {
                lines.push(line?);
            }
            lines.join("\n")
        }
    };
    Ok(text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect())
}

fn cmd_encode(
    opts: &Options,
    names: &[String],
    input_file: Option<&PathBuf>,
    forced: Option<Encoding>,
    allowed: EncodingSet,
    framed: bool,
) -> i32 {
    let specials = match specials(opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("metastring: {e}");
            return 1;
        }
    };
    let encoder = MetaStringEncoder::with_specials(specials).allowed_encodings(allowed);

    let mut names = names.to_vec();
    if input_file.is_some() || names.is_empty() {
        match read_names(input_file) {
            Ok(more) => names.extend(more),
            Err(e) => {
                eprintln!("metastring: cannot read names: {e}");
                return 1;
            }
        }
    }

    let mut encoded = Vec::with_capacity(names.len());
    for name in &names {
        let result = match forced {
            Some(encoding) => encoder.encode_with_encoding(name, encoding),
            None => encoder.encode(name),
        };
        match result {
            Ok(ms) => encoded.push(ms),
            Err(e) => {
                eprintln!("metastring: {name:?}: {e}");
                return 1;
            }
        }
    }

    if opts.json_output {
        let list: Vec<_> = encoded.iter().map(meta_json).collect();
        return print_json(&serde_json::Value::Array(list));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut raw_total = 0usize;
    let mut packed_total = 0usize;
    for ms in &encoded {
        let input = ms.input_string().unwrap_or_default();
        raw_total += input.len();
        packed_total += ms.encoded_bytes().len();
        let hex = if framed {
            to_hex(&wire::to_bytes(ms))
        } else {
            to_hex(ms.encoded_bytes())
        };
        let line = if opts.quiet {
            writeln!(out, "{hex}")
        } else {
            writeln!(
                out,
                "{input}\t{}\tstrip={}\t{}\t{hex}",
                ms.encoding(),
                u8::from(ms.strip_last_char()),
                ms.encoded_bytes().len()
            )
        };
        if let Err(e) = line {
            eprintln!("metastring: write error: {e}");
            return 1;
        }
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "metastring: encoded {} name(s): {raw_total} -> {packed_total} bytes",
            encoded.len()
        );
    }

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options, encoding: Encoding, payload: &[u8]) -> i32 {
    // UTF-8 payloads ignore the special characters entirely.
    let decoder = match encoding {
        Encoding::Utf8 => Ok(MetaStringDecoder::default()),
        _ => specials(opts).map(MetaStringDecoder::with_specials),
    };
    let text = match decoder.and_then(|d| d.decode(encoding, payload)) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("metastring: decode error: {e}");
            return 1;
        }
    };

    if opts.json_output {
        let strip = encoding != Encoding::Utf8 && bits::strip_flag(payload);
        return print_json(&serde_json::json!({
            "encoding": encoding.name(),
            "decoded": text,
            "strip_last_char": strip,
        }));
    }

    println!("{text}");
    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options, records: &[u8]) -> i32 {
    let mut pos = 0;
    let mut parsed = Vec::new();
    while pos < records.len() {
        match read_meta_string(&records[pos..]) {
            Ok((ms, used)) => {
                if opts.verbose > 1 {
                    eprintln!("metastring: record at offset {pos}: {used} bytes");
                }
                parsed.push(ms);
                pos += used;
            }
            Err(e) => {
                eprintln!("metastring: record at offset {pos}: {e}");
                return 1;
            }
        }
    }

    if opts.json_output {
        let list: Vec<_> = parsed.iter().map(meta_json).collect();
        return print_json(&serde_json::Value::Array(list));
    }

    for ms in &parsed {
        println!(
            "{}\t{}\tspecials={}{}\tstrip={}\t{}",
            ms.input_string().unwrap_or_default(),
            ms.encoding(),
            char::from(ms.special_char1()),
            char::from(ms.special_char2()),
            u8::from(ms.strip_last_char()),
            to_hex(ms.encoded_bytes())
        );
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    let default_filter = match opts.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match &opts.command {
        Command::Encode {
            names,
            input_file,
            encoding,
            allowed,
            framed,
        } => cmd_encode(
            &opts,
            names,
            input_file.as_ref(),
            *encoding,
            *allowed,
            *framed,
        ),
        Command::Decode { encoding, payload } => cmd_decode(&opts, *encoding, payload),
        Command::Inspect { records } => cmd_inspect(&opts, records),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}
