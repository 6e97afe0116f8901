// ============================================================================
// Headless mode: put text on images from the command line
// ============================================================================
//
// Usage examples:
//   iwt -i photo.jpg -t "Hello" --at 120,80 -o captioned.png
//   iwt -i photo.jpg -t "Sale" --size 28 --color "#ff0000" --bold --available 1216x544
//   iwt -i "shots/*.png" -t "draft" --output-dir out/ --format jpg -q 85
//   iwt --list-fonts --fonts-catalog webfonts.json
//
// Everything runs synchronously on the current thread.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use iwt::compose::{element_size, render_full_resolution, render_view};
use iwt::config::Preferences;
use iwt::fonts::{FontDirectory, LoadedFont, SystemFonts, WebfontsCatalog, list_families, load_font};
use iwt::geometry::{AvailableArea, Bounds};
use iwt::io::{SaveFormat, encode_and_write};
use iwt::style::{FontWeight, TextStyle, parse_color, parse_font_size};
use iwt::{EditorSession, log_err, log_info, log_warn};

/// ImageWithText headless renderer.
#[derive(Parser, Debug)]
#[command(
    name = "iwt",
    about = "Overlay styled text on images and export the result",
    long_about = "Place a line of text on one or more images and write the composited\n\
                  result. The text is centred on --at and kept inside the image.\n\n\
                  Example:\n  \
                  iwt -i photo.jpg -t \"Hello\" --at 120,80 -o captioned.png"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, num_args = 1.., required_unless_present = "list_fonts")]
    pub input: Vec<String>,

    /// Text to overlay. Defaults to the configured default text.
    #[arg(short, long)]
    pub text: Option<String>,

    /// Drop point "X,Y" in view coordinates; the text is centred on it and
    /// clamped to the image. Omit to place the text at the top-left corner.
    #[arg(long, value_name = "X,Y")]
    pub at: Option<String>,

    /// Font size in pixels (capped at 32).
    #[arg(long, value_name = "PX")]
    pub size: Option<String>,

    /// Text colour: #rgb, #rrggbb, #rrggbbaa or r,g,b[,a].
    #[arg(long, value_name = "COLOR")]
    pub color: Option<String>,

    /// Font family name.
    #[arg(long, value_name = "FAMILY")]
    pub family: Option<String>,

    /// Use the bold weight.
    #[arg(long)]
    pub bold: bool,

    /// Display area "WxH" the image is fitted into before the text is placed.
    /// Without it the image is used at natural size.
    #[arg(long, value_name = "WxH")]
    pub available: Option<String>,

    /// Export at the source's natural size instead of the fitted view size.
    #[arg(long)]
    pub full_resolution: bool,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, bmp, tga. Inferred from --output when omitted.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// List available font families and exit.
    #[arg(long)]
    pub list_fonts: bool,

    /// Web-fonts JSON catalog to list families from instead of the system.
    #[arg(long, value_name = "FILE")]
    pub fonts_catalog: Option<PathBuf>,

    /// Store the resulting text style as the defaults for future sessions.
    #[arg(long)]
    pub save_defaults: bool,

    /// Echo the session log and per-file timing to the terminal.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// `true` when a headless-mode flag is present in the process arguments.
    pub fn is_cli_mode() -> bool {
        std::env::args().skip(1).any(|a| {
            a == "--input" || a == "-i" || a == "--list-fonts" || a.starts_with("--input=")
        })
    }
}

/// Everything that is shared by every file in a run.
struct RenderJob {
    style: TextStyle,
    font: Option<LoadedFont>,
    drop_point: Option<(f32, f32)>,
    area: Option<AvailableArea>,
    full_resolution: bool,
    format: SaveFormat,
    quality: u8,
}

/// Run headless mode and return an OS exit code.
/// `0` = all files succeeded, `1` = bad arguments or any file failed.
pub fn run(args: CliArgs) -> ExitCode {
    iwt::logger::set_echo(args.verbose);
    let prefs = Preferences::load();

    if args.list_fonts {
        return list_fonts(args.fonts_catalog.as_deref().or(prefs.fonts_catalog.as_deref()));
    }

    let job = match build_job(&args, &prefs) {
        Ok(job) => job,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.save_defaults {
        let mut defaults = prefs.clone();
        defaults.default_text = job.style.text.clone();
        defaults.default_font_size = job.style.font_size;
        defaults.default_family = job.style.family.clone();
        defaults.default_color = job.style.color;
        defaults.default_weight = job.style.weight;
        defaults.save();
        log_info!("saved text defaults");
    }

    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            job.format,
            &prefs.export_file_name,
            multi,
        ) else {
            eprintln!("  error: cannot determine output path for '{}'.", input_path.display());
            any_failure = true;
            continue;
        };

        match run_one(input_path, &output_path, &job) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log_err!("{}: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure {
        if let Some(log) = iwt::logger::log_path() {
            eprintln!("details in {}", log.display());
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn list_fonts(catalog: Option<&Path>) -> ExitCode {
    let families = match catalog {
        Some(path) => {
            let directory = WebfontsCatalog::new(path);
            match directory.families() {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("error: {}: {}", path.display(), e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => list_families(&SystemFonts),
    };
    for family in families {
        println!("{}", family);
    }
    ExitCode::SUCCESS
}

/// Merge the preferences with the command-line overrides.
fn build_job(args: &CliArgs, prefs: &Preferences) -> Result<RenderJob, String> {
    let mut style = prefs.initial_style();
    if let Some(text) = &args.text {
        style = style.with_text(text.as_str());
    }
    if let Some(size) = &args.size {
        let size = parse_font_size(size).ok_or_else(|| format!("invalid font size '{}'", size))?;
        style = style.with_font_size(size);
    }
    if let Some(color) = &args.color {
        let color = parse_color(color).ok_or_else(|| format!("invalid colour '{}'", color))?;
        style = style.with_color(color);
    }
    if let Some(family) = &args.family {
        style = style.with_family(family.as_str());
    }
    if args.bold {
        style = style.with_weight(FontWeight::Bold);
    }

    let drop_point = match &args.at {
        Some(s) => Some(parse_point(s).ok_or_else(|| format!("invalid --at '{}', expected X,Y", s))?),
        None => None,
    };
    let area = match &args.available {
        Some(s) => Some(parse_area(s).ok_or_else(|| format!("invalid --available '{}', expected WxH", s))?),
        None => None,
    };

    let format = match args.format.as_deref() {
        Some(name) => SaveFormat::from_name(name).ok_or_else(|| format!("unknown format '{}'", name))?,
        None => args.output.as_deref().map(SaveFormat::from_path).unwrap_or_default(),
    };

    let font = if style.text.trim().is_empty() {
        None
    } else {
        let font = load_font(&style.family, style.weight);
        if font.is_none() {
            log_warn!("no usable font for '{}', text will be skipped", style.family);
            eprintln!("warning: no usable font for '{}', exporting without text.", style.family);
        }
        font
    };

    Ok(RenderJob {
        style,
        font,
        drop_point,
        area,
        full_resolution: args.full_resolution,
        format,
        quality: args.quality,
    })
}

fn run_one(input: &Path, output: &Path, job: &RenderJob) -> Result<(), String> {
    let mut session = EditorSession::new(job.style.clone());
    session
        .open_image(input, job.area)
        .map_err(|e| format!("load failed: {}", e))?;

    if let Some(point) = job.drop_point {
        let (ew, eh) = element_size(&session.style, job.font.as_ref());
        let container = Bounds::new(0.0, 0.0, session.fit.render_width, session.fit.render_height);
        session.begin_drag();
        session.end_drag(point, Bounds::new(0.0, 0.0, ew, eh), container);
    }

    let Some(image) = &session.image else {
        return Err("no image loaded".to_string());
    };

    let composed = if job.full_resolution {
        render_full_resolution(image, &session.fit, &session.style, session.position, job.font.as_ref())
    } else {
        render_view(image, &session.fit, &session.style, session.position, job.font.as_ref())
    };

    encode_and_write(&composed, output, job.format, job.quality)
        .map_err(|e| format!("save failed: {}", e))?;
    log_info!("exported {} ({}x{})", output.display(), composed.width(), composed.height());
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand `-i` arguments into a de-duplicated file list in argument order.
/// Existing paths are taken literally, anything else is a glob whose matches
/// are sorted. Directories are skipped.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let literal = Path::new(pattern);
        let candidates: Vec<PathBuf> = if literal.exists() {
            vec![literal.to_path_buf()]
        } else {
            match glob::glob(pattern) {
                Ok(paths) => {
                    let mut paths: Vec<PathBuf> = paths.flatten().collect();
                    paths.sort();
                    paths
                }
                Err(e) => {
                    log_warn!("invalid glob '{}': {}", pattern, e);
                    eprintln!("warning: invalid glob '{}': {}", pattern, e);
                    continue;
                }
            }
        };

        let before = files.len();
        for path in candidates.into_iter().filter(|p| p.is_file()) {
            if !files.contains(&path) {
                files.push(path);
            }
        }
        if files.len() == before {
            log_warn!("'{}' added no input files", pattern);
            eprintln!("warning: '{}' matched no new files.", pattern);
        }
    }

    files
}

/// Output path for one input.
///
/// Priority:
/// 1. `--output`
/// 2. `--output-dir`, named after the input stem
/// 3. the configured export name in the current directory (single input)
/// 4. next to the input as `<stem>_text.<ext>` (batch without a directory)
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
    export_name: &str,
    batch: bool,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    if !batch {
        return Some(Path::new(export_name).with_extension(ext));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    Some(parent.join(format!("{}_text.{}", stem, ext)))
}

/// Parse "X,Y".
fn parse_point(s: &str) -> Option<(f32, f32)> {
    let (x, y) = s.split_once(',')?;
    let x: f32 = x.trim().parse().ok()?;
    let y: f32 = y.trim().parse().ok()?;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Parse "WxH" into a valid display area.
fn parse_area(s: &str) -> Option<AvailableArea> {
    let lower = s.to_lowercase();
    let (w, h) = lower.split_once('x')?;
    AvailableArea::new(w.trim().parse().ok()?, h.trim().parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("iwt-cli-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn inputs_are_globbed_sorted_and_deduplicated() {
        let dir = scratch_dir("glob");
        for name in ["b.png", "a.png", "notes.txt"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }
        std::fs::create_dir_all(dir.join("nested.png")).unwrap();

        let glob = dir.join("*.png").display().to_string();
        let literal = dir.join("a.png").display().to_string();
        let files = resolve_inputs(&[glob, literal]);
        assert_eq!(files, vec![dir.join("a.png"), dir.join("b.png")]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unmatched_and_invalid_patterns_yield_nothing() {
        let dir = scratch_dir("nomatch");
        let missing = dir.join("*.jpg").display().to_string();
        assert!(resolve_inputs(&[missing, "[".to_string()]).is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn points_parse() {
        assert_eq!(parse_point("10,20"), Some((10.0, 20.0)));
        assert_eq!(parse_point(" 1.5 , -2 "), Some((1.5, -2.0)));
        assert_eq!(parse_point("10"), None);
        assert_eq!(parse_point("a,b"), None);
        assert_eq!(parse_point("inf,1"), None);
    }

    #[test]
    fn areas_parse() {
        let area = parse_area("1216x544").unwrap();
        assert_eq!((area.width(), area.height()), (1216.0, 544.0));
        assert!(parse_area("400X300").is_some());
        assert!(parse_area("0x300").is_none());
        assert!(parse_area("400").is_none());
    }

    #[test]
    fn explicit_output_wins() {
        let p = build_output_path(
            Path::new("in/a.jpg"),
            Some(Path::new("x.bmp")),
            Some(Path::new("dir")),
            SaveFormat::Png,
            "iwt-image.png",
            false,
        );
        assert_eq!(p, Some(PathBuf::from("x.bmp")));
    }

    #[test]
    fn output_dir_uses_input_stem() {
        let p = build_output_path(
            Path::new("in/a.jpg"),
            None,
            Some(Path::new("out")),
            SaveFormat::Jpeg,
            "iwt-image.png",
            true,
        );
        assert_eq!(p, Some(PathBuf::from("out/a.jpg")));
    }

    #[test]
    fn single_input_defaults_to_export_name() {
        let p = build_output_path(Path::new("in/a.jpg"), None, None, SaveFormat::Png, "iwt-image.png", false);
        assert_eq!(p, Some(PathBuf::from("iwt-image.png")));
    }

    #[test]
    fn batch_without_dir_writes_next_to_input() {
        let p = build_output_path(Path::new("in/a.png"), None, None, SaveFormat::Png, "iwt-image.png", true);
        assert_eq!(p, Some(PathBuf::from("in/a_text.png")));
    }

    #[test]
    fn args_parse_with_overrides() {
        let args = CliArgs::try_parse_from([
            "iwt", "-i", "a.png", "-t", "Hi", "--at", "5,6", "--size", "40", "--bold",
        ])
        .unwrap();
        assert_eq!(args.input, vec!["a.png"]);
        assert_eq!(args.at.as_deref(), Some("5,6"));
        assert!(args.bold);
    }

    #[test]
    fn list_fonts_needs_no_input() {
        let args = CliArgs::try_parse_from(["iwt", "--list-fonts"]).unwrap();
        assert!(args.list_fonts);
        assert!(CliArgs::try_parse_from(["iwt"]).is_err());
    }
}
