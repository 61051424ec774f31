//! Native island viewer.
//!
//! ```text
//! isle [options.toml] [--asset <url-or-path>] [--preset <name>]
//! ```
//!
//! A TOML file wins over `--preset` (`island` or `pan_locked`); fields it
//! omits take their defaults. `--asset` overrides the asset URL of either.

use std::path::PathBuf;
use std::process::ExitCode;

use isle::{Options, SceneError, Viewer};

#[derive(Debug, Default)]
struct Args {
    options_path: Option<PathBuf>,
    asset: Option<String>,
    preset: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--asset" => {
                parsed.asset =
                    Some(args.next().ok_or("--asset needs a value")?);
            }
            "--preset" => {
                parsed.preset =
                    Some(args.next().ok_or("--preset needs a value")?);
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag {flag}"));
            }
            _ if parsed.options_path.is_none() => {
                parsed.options_path = Some(PathBuf::from(arg));
            }
            _ => return Err(format!("unexpected argument {arg}")),
        }
    }
    Ok(parsed)
}

fn resolve_options(args: &Args) -> Result<Options, SceneError> {
    match (&args.options_path, &args.preset) {
        (Some(path), _) => Options::load(path),
        (None, Some(name)) => Options::builtin(name).ok_or_else(|| {
            SceneError::OptionsParse(format!("unknown preset {name}"))
        }),
        (None, None) => Ok(Options::default()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            log::error!(
                "{e}\nusage: isle [options.toml] [--asset <url>] \
                 [--preset <name>]"
            );
            return ExitCode::FAILURE;
        }
    };

    let options = match resolve_options(&args) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut builder = Viewer::builder().with_options(options);
    if let Some(asset) = args.asset {
        builder = builder.with_asset(asset);
    }
    match builder.build().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn parses_path_asset_and_preset() {
        let parsed =
            args(&["scene.toml", "--asset", "island.glb", "--preset", "x"])
                .unwrap();
        assert_eq!(parsed.options_path, Some(PathBuf::from("scene.toml")));
        assert_eq!(parsed.asset.as_deref(), Some("island.glb"));
        assert_eq!(parsed.preset.as_deref(), Some("x"));
    }

    #[test]
    fn rejects_unknown_flags_and_missing_values() {
        assert!(args(&["--verbose"]).is_err());
        assert!(args(&["--asset"]).is_err());
        assert!(args(&["a.toml", "b.toml"]).is_err());
    }

    #[test]
    fn preset_lookup() {
        let locked = resolve_options(&Args {
            preset: Some("pan_locked".into()),
            ..Args::default()
        })
        .unwrap();
        assert_eq!(locked, Options::pan_locked());
        assert!(resolve_options(&Args {
            preset: Some("volcano".into()),
            ..Args::default()
        })
        .is_err());
    }
}
