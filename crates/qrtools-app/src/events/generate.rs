use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::NaiveDateTime;
use qrtools_config::GeneratorConfig;
use qrtools_core::{OutputFormat, auto_save_file_name, encode, unique_path};

use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub text: String,
    pub format: OutputFormat,
    /// Explicit destination, skips auto naming and the prompt
    pub output: Option<PathBuf>,
}

/// Free auto-named path inside the configured save directory
pub fn auto_save_path(generator: &GeneratorConfig, format: OutputFormat, now: NaiveDateTime) -> PathBuf {
    let file_name = auto_save_file_name(
        &generator.auto_save_name,
        generator.append_date,
        generator.append_time,
        now,
        format.extension(),
    );
    unique_path(&generator.auto_save_directory, &file_name)
}

fn with_format_extension(mut path: PathBuf, format: OutputFormat) -> PathBuf {
    if path.extension().is_none() {
        path.set_extension(format.extension());
    }
    path
}

/// Decide where a generated code goes.
///
/// `None` means the user backed out of the prompt.
pub fn choose_save_path<R: BufRead, W: Write>(
    generator: &GeneratorConfig,
    format: OutputFormat,
    explicit: Option<PathBuf>,
    now: NaiveDateTime,
    input: &mut R,
    prompt: &mut W,
) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(with_format_extension(path, format)));
    }

    let auto = auto_save_path(generator, format, now);
    if generator.skip_save_dialog {
        return Ok(Some(auto));
    }

    write!(prompt, "Save QR code as [{}]: ", auto.display())?;
    prompt.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let line = line.trim();
    if line.is_empty() {
        Ok(Some(auto))
    } else {
        Ok(Some(with_format_extension(PathBuf::from(line), format)))
    }
}

/// Encode `request.text` and write it to the chosen path
pub fn generate_to<R: BufRead, W: Write>(
    generator: &GeneratorConfig,
    request: GenerateRequest,
    now: NaiveDateTime,
    input: &mut R,
    prompt: &mut W,
) -> anyhow::Result<Option<PathBuf>> {
    if request.text.trim().is_empty() {
        bail!("Nothing to encode, the text is empty");
    }

    let encoded = encode(&request.text, request.format).context("Failed to generate QR code")?;
    tracing::debug!(
        "Encoded {} chars as {:?} ({} bytes)",
        request.text.len(),
        encoded.format(),
        encoded.as_bytes().len()
    );

    let Some(path) =
        choose_save_path(generator, request.format, request.output, now, input, prompt)?
    else {
        tracing::info!("Save cancelled");
        return Ok(None);
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, encoded.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Saved QR code to {}", path.display());
    Ok(Some(path))
}

pub async fn run_generate(
    state: &AppState,
    request: GenerateRequest,
) -> anyhow::Result<Option<PathBuf>> {
    let generator = state.config.read().await.generator.clone();
    let now = chrono::Local::now().naive_local();

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut prompt = std::io::stderr();
    generate_to(&generator, request, now, &mut input, &mut prompt)
}
