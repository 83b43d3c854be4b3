//! `inlay build` command implementation.

use inlay_core::Options;
use miette::{miette, IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build command action.
#[derive(Debug, Clone)]
pub struct BuildAction {
    pub entry: PathBuf,
    pub cwd: PathBuf,
    pub output: Option<PathBuf>,
    pub map: bool,
    pub root: Option<PathBuf>,
    pub aliases: Vec<String>,
    pub shims: Vec<String>,
    pub prepend: Vec<String>,
    pub config: Option<PathBuf>,
}

/// Run the build command.
pub fn run(action: BuildAction) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    runtime.block_on(execute(action))
}

async fn execute(action: BuildAction) -> Result<()> {
    let opts = load_options(&action)?;
    debug!(root = %opts.root.display(), "resolved options");

    let entry = absolute(&action.cwd, &action.entry);
    let entry = dunce::canonicalize(&entry)
        .map_err(|e| miette!("cannot open {}: {e}", entry.display()))?;
    let source = fs::read_to_string(&entry).into_diagnostic()?;

    info!(entry = %entry.display(), "inlining");
    let document = inlay_core::process(&source, Some(&entry), &opts)
        .await
        .into_diagnostic()?;

    match &action.output {
        Some(output) => {
            let output = absolute(&action.cwd, output);
            if action.map {
                let (css, map) = document.to_css_with_map(&opts.root);
                fs::write(&output, css).into_diagnostic()?;
                let sidecar = sidecar_path(&output);
                let encoded = serde_json::to_string_pretty(&map).into_diagnostic()?;
                fs::write(&sidecar, encoded).into_diagnostic()?;
                info!(output = %output.display(), map = %sidecar.display(), "wrote output");
            } else {
                fs::write(&output, document.to_css()).into_diagnostic()?;
                info!(output = %output.display(), "wrote output");
            }
        }
        None => print!("{}", document.to_css()),
    }

    Ok(())
}

/// Merge the optional JSON config file with command-line flags. Flags win.
fn load_options(action: &BuildAction) -> Result<Options> {
    let mut opts = match &action.config {
        Some(config) => {
            let config = absolute(&action.cwd, config);
            let text = fs::read_to_string(&config)
                .map_err(|e| miette!("cannot read {}: {e}", config.display()))?;
            let value: serde_json::Value = serde_json::from_str(&text).into_diagnostic()?;
            let base = config.parent().unwrap_or(&action.cwd);
            Options::from_json(&value, base).into_diagnostic()?
        }
        None => Options::new(&action.cwd),
    };

    if let Some(root) = &action.root {
        opts.root = absolute(&action.cwd, root);
    }
    for pair in &action.aliases {
        let (name, target) = split_pair(pair, "alias")?;
        opts.alias.insert(name.to_string(), target.to_string());
    }
    for pair in &action.shims {
        let (name, entry) = split_pair(pair, "shim")?;
        opts.shim.insert(name.to_string(), entry.to_string());
    }
    opts.prepend.extend(action.prepend.iter().cloned());

    Ok(opts)
}

fn split_pair<'a>(pair: &'a str, flag: &str) -> Result<(&'a str, &'a str)> {
    pair.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| miette!("invalid --{flag} \"{pair}\": expected NAME=VALUE"))
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn sidecar_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".map.json");
    PathBuf::from(name)
}
