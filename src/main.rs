//! Command-line front end for signing and verifying JSON parameter maps.
//! The secret is never taken from the command line; it comes from the
//! configured secret source.

use std::env;
use std::process::ExitCode;

use log::LevelFilter;
use serde_json::json;
use thiserror::Error;

use param_sign::config::{load_config, ConfigError, SharedSecret, SignerConfig};
use param_sign::{ParameterMap, Signer};

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("invalid parameter json: {0}")]
    Params(String),
}

fn print_usage() {
    eprintln!("Commands:\n  sign <params-json> [config-path]\n  verify <params-json> [config-path]\n  canonical <params-json> [config-path]\n  load-config <path>\n\nWithout a config file the secret is read from $PARAM_SIGN_SECRET.\n$PARAM_SIGN_ALGORITHM overrides the digest algorithm (md5, sha256, sha512).");
}

fn init_logging() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Parameters, signer, and secret shared by every signing command.
struct Invocation {
    params: ParameterMap,
    signer: Signer,
    secret: SharedSecret,
}

impl Invocation {
    fn prepare(params_json: &str, config_path: Option<&String>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => load_config(path)?,
            None => SignerConfig::default(),
        }
        .apply_env_overrides()?;
        let params: ParameterMap =
            serde_json::from_str(params_json).map_err(|e| CliError::Params(format!("{e}")))?;
        let secret = config.secret.load()?;
        Ok(Self {
            params,
            signer: Signer::from_config(&config),
            secret,
        })
    }
}

/// The empty-signature sentinel prints nothing at all.
fn signature_line(signature: &str) -> Option<&str> {
    (!signature.is_empty()).then_some(signature)
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "sign" | "verify" | "canonical" => {
            if !(3..=4).contains(&args.len()) {
                print_usage();
                return ExitCode::FAILURE;
            }
            let invocation = match Invocation::prepare(&args[2], args.get(3)) {
                Ok(invocation) => invocation,
                Err(err) => {
                    eprintln!("{err}");
                    return ExitCode::FAILURE;
                }
            };
            let Invocation { params, signer, secret } = &invocation;
            match args[1].as_str() {
                "sign" => {
                    if let Some(line) = signature_line(&signer.sign(params, secret.expose())) {
                        println!("{line}");
                    }
                }
                "canonical" => println!("{}", signer.canonical_string(params, secret.expose())),
                _ => {
                    if !signer.verify(params, secret.expose()) {
                        println!("rejected");
                        return ExitCode::FAILURE;
                    }
                    println!("verified");
                }
            }
            ExitCode::SUCCESS
        }
        "load-config" => {
            if args.len() != 3 {
                print_usage();
                return ExitCode::FAILURE;
            }
            match load_config(&args[2]).and_then(SignerConfig::apply_env_overrides) {
                Ok(cfg) => {
                    let printable = json!({
                        "algorithm": cfg.algorithm.as_str(),
                        "signatureField": cfg.signature_field,
                        "secretSource": cfg.secret_source(),
                        "secret": "<redacted in output>"
                    });
                    match serde_json::to_string_pretty(&printable) {
                        Ok(text) => println!("{text}"),
                        Err(err) => eprintln!("rendering config failed: {err}"),
                    }
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("config load failed: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            print_usage();
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use param_sign::{ParameterMap, Signer};

    use super::signature_line;

    #[test]
    fn empty_signature_prints_nothing() {
        let signer = Signer::new();
        assert_eq!(signature_line(&signer.sign(&ParameterMap::new(), "k")), None);
    }

    #[test]
    fn signature_prints_as_is() {
        let params: ParameterMap = serde_json::from_str(r#"{"a": "1", "b": null}"#).expect("params json");
        let signature = Signer::new().sign(&params, "k");
        assert_eq!(signature_line(&signature), Some(signature.as_str()));
    }
}
