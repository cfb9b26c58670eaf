use std::collections::VecDeque;
use std::error::Error;
use std::fs;
use std::io::Read;

use serde::Deserialize;
use tensorgate::{DecodeOptions, DecodedRequest, RequestDecoder, TensorInfo, TensorInfoMap};
use tracing_subscriber::EnvFilter;

mod spec_arg;

use spec_arg::parse_tensor_spec;

enum Command {
    /// Decode a request document and summarize the tensors it contains.
    Decode {
        request: String,
        signature: Option<String>,
        options: Option<String>,
        strict: bool,
        stateful: bool,
        dump: bool,
    },

    /// Intersect two tensor specifications.
    Intersect { left: String, right: String },
}

struct Args {
    command: Command,
    verbose: bool,
}

fn parse_args() -> Result<Args, lexopt::Error> {
    use lexopt::prelude::*;

    let mut values = VecDeque::new();
    let mut verbose = false;
    let mut signature = None;
    let mut options = None;
    let mut strict = false;
    let mut stateful = false;
    let mut dump = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Value(val) => values.push_back(val.string()?),
            Short('v') | Long("verbose") => verbose = true,
            Short('s') | Long("signature") => signature = Some(parser.value()?.string()?),
            Short('o') | Long("options") => options = Some(parser.value()?.string()?),
            Long("strict") => strict = true,
            Long("stateful") => stateful = true,
            Long("dump") => dump = true,
            Short('h') | Long("help") => {
                println!(
                    "Decode inference requests and check tensor specifications.

Usage:
  {bin_name} decode [OPTIONS] <request>
  {bin_name} intersect <spec> <spec>

Use \"-\" as <request> to read the request from stdin. Tensor specs have the
form `name[/mapped_name]:PRECISION:SHAPE[:LAYOUT]`, eg. `image:FP32:(1,3,-1,220:230):NCHW`.

  -s, --signature <file>  JSON file listing the model inputs
  -o, --options <file>    JSON file with decoder options
      --strict            Reject inputs whose shape differs from the signature
      --stateful          Extract the sequence_id and sequence_control_input inputs
      --dump              Print the decoded inputs as JSON
  -v, --verbose           Enable verbose logging
  -h, --help              Print help
",
                    bin_name = parser.bin_name().unwrap_or("tensorgate")
                );
                std::process::exit(0);
            }
            _ => return Err(arg.unexpected()),
        }
    }

    let command_name = values.pop_front().ok_or("missing `<command>` arg")?;
    let command = match command_name.as_str() {
        "decode" => Command::Decode {
            request: values.pop_front().ok_or("missing `<request>` arg")?,
            signature,
            options,
            strict,
            stateful,
            dump,
        },
        "intersect" => {
            let left = values.pop_front().ok_or("missing `<spec>` arg")?;
            let right = values.pop_front().ok_or("missing second `<spec>` arg")?;
            Command::Intersect { left, right }
        }
        _ => return Err(format!("unknown command \"{}\"", command_name).into()),
    };

    if let Some(extra) = values.pop_front() {
        return Err(format!("unexpected argument \"{}\"", extra).into());
    }

    Ok(Args { command, verbose })
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Model signature file. Inputs are keyed by their exposed name.
#[derive(Deserialize)]
struct Signature {
    inputs: Vec<TensorInfo>,
}

fn load_signature(text: &str) -> Result<TensorInfoMap, serde_json::Error> {
    let signature: Signature = serde_json::from_str(text)?;
    Ok(signature
        .inputs
        .into_iter()
        .map(|info| (info.exposed_name().to_string(), info))
        .collect())
}

fn read_request(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        Ok(body)
    } else {
        fs::read_to_string(path)
    }
}

/// Format a one-line summary for each input, sorted by name.
fn summarize(request: &DecodedRequest) -> Vec<String> {
    let mut names: Vec<&String> = request.inputs().keys().collect();
    names.sort();
    names
        .into_iter()
        .filter_map(|name| {
            let tensor = request.input(name)?;
            let kind = if tensor.is_binary() { "binary" } else { "numeric" };
            Some(format!(
                "  {}: {} {:?} {} ({} bytes)",
                name,
                tensor.precision(),
                tensor.shape(),
                kind,
                tensor.byte_len()
            ))
        })
        .collect()
}

/// Tool for decoding inference requests and checking that tensor
/// specifications are compatible.
///
/// Log verbosity is controlled by `--verbose` or the `RUST_LOG` environment
/// variable.
fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;
    init_logging(args.verbose);

    match args.command {
        Command::Decode {
            request,
            signature,
            options,
            strict,
            stateful,
            dump,
        } => {
            let hints = match signature {
                Some(path) => {
                    let hints = load_signature(&fs::read_to_string(&path)?)?;
                    tracing::debug!(path = %path, inputs = hints.len(), "loaded signature");
                    Some(hints)
                }
                None => None,
            };
            let mut options = match options {
                Some(path) => {
                    serde_json::from_str::<DecodeOptions>(&fs::read_to_string(path)?)?
                }
                None => DecodeOptions::default(),
            }
            .with_env_overrides();
            options.strict_shapes |= strict;
            options.stateful |= stateful;

            let decoder = match &hints {
                Some(hints) => RequestDecoder::with_hints(hints),
                None => RequestDecoder::new(),
            }
            .with_options(options);

            let decoded = decoder.decode_str(&read_request(&request)?)?;

            println!("Order: {:?}", decoded.order());
            println!("Format: {:?}", decoded.format());
            if let Some(name) = decoded.signature_name() {
                println!("Signature: {}", name);
            }
            if let Some(session) = decoded.session() {
                println!("Session: {}", session);
            }
            println!("Inputs:");
            for line in summarize(&decoded) {
                println!("{}", line);
            }

            if dump {
                let inputs: serde_json::Map<String, serde_json::Value> = decoded
                    .inputs()
                    .iter()
                    .map(|(name, tensor)| (name.clone(), tensor.to_json()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&inputs)?);
            }
        }
        Command::Intersect { left, right } => {
            let left = parse_tensor_spec(&left)?;
            let right = parse_tensor_spec(&right)?;
            let joined = left.intersect(&right)?;
            println!("{}", joined);
        }
    }

    Ok(())
}
