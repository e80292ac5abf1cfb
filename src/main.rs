use clap::{Parser, Subcommand};
use rastermill::transform::{
    ConversionRequest, ConversionResult, CropRect, EditRequest, FrameOptions, ImageCodec,
    OutputFormat, Quality, RustCodec, SourceImage,
};
use rastermill::{batch, config, output, transform};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rastermill")]
#[command(about = "Convert, compress, and edit images from the command line")]
#[command(long_about = "\
Convert, compress, and edit images from the command line

All pixel work happens in memory against the built-in codec (JPEG, PNG,
WebP). Quality is given as 0.0-1.0 and ignored for PNG output.

Examples:

  rastermill convert photo.jpg --format webp --quality 0.8 --width 1200
  rastermill smart screenshot.png --format jpeg
  rastermill target-size photo.jpg --format webp --target-kb 200
  rastermill edit photo.jpg --rotate 90 --flip-h --crop 10,10,800,600
  rastermill batch ./shots --format webp --out-dir ./converted
  rastermill frames a.png b.png c.png --interval 0.2 --out-dir ./frames

Run 'rastermill gen-config' to print a documented rastermill.toml.")]
#[command(version)]
struct Cli {
    /// Path to rastermill.toml (stock defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that produce a conversion.
#[derive(clap::Args, Clone)]
struct ConvertArgs {
    /// Output format: jpeg, png, or webp
    #[arg(long)]
    format: OutputFormat,

    /// Encoding quality in 0.0-1.0 (ignored for png)
    #[arg(long)]
    quality: Option<f32>,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Allow the aspect ratio to distort when resizing
    #[arg(long)]
    no_aspect: bool,
}

impl ConvertArgs {
    fn to_request(&self) -> ConversionRequest {
        ConversionRequest {
            format: self.format,
            quality: self.quality.map(Quality::new).unwrap_or_default(),
            width: self.width,
            height: self.height,
            maintain_aspect_ratio: !self.no_aspect,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Convert a single image to another format, quality, or size
    Convert {
        input: PathBuf,
        #[command(flatten)]
        args: ConvertArgs,
        /// Output path (defaults to the input with the new extension)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Convert with content-aware format and quality selection
    Smart {
        input: PathBuf,
        #[command(flatten)]
        args: ConvertArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Search for the quality that best approaches a target file size
    TargetSize {
        input: PathBuf,
        #[command(flatten)]
        args: ConvertArgs,
        /// Desired output size in kilobytes
        #[arg(long)]
        target_kb: f64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Rotate, flip, and/or crop an image (re-encoded in its own format)
    Edit {
        input: PathBuf,
        /// Rotation in degrees, clockwise (any integer)
        #[arg(long, default_value_t = 0)]
        rotate: i32,
        /// Mirror horizontally
        #[arg(long)]
        flip_h: bool,
        /// Mirror vertically
        #[arg(long)]
        flip_v: bool,
        /// Crop rectangle as x,y,width,height (applied after rotate/flip)
        #[arg(long, value_parser = parse_crop)]
        crop: Option<CropRect>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Convert every image in a directory, sequentially, with progress
    Batch {
        /// Directory to scan for jpeg/png/webp files
        dir: PathBuf,
        #[command(flatten)]
        args: ConvertArgs,
        /// Output directory (also receives report.json)
        #[arg(long, default_value = "converted")]
        out_dir: PathBuf,
    },
    /// Normalize images to uniform frames for animation assembly
    Frames {
        /// Frame images, in order
        inputs: Vec<PathBuf>,
        /// Frame width (suggested from the first input when omitted)
        #[arg(long)]
        width: Option<u32>,
        /// Frame height (suggested from the first input when omitted)
        #[arg(long)]
        height: Option<u32>,
        /// Seconds between frames (config default when omitted)
        #[arg(long)]
        interval: Option<f32>,
        /// Directory for the normalized PNG frames
        #[arg(long, default_value = "frames")]
        out_dir: PathBuf,
    },
    /// Print a stock rastermill.toml with all options documented
    GenConfig,
}

fn parse_crop(s: &str) -> Result<CropRect, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 4 {
        return Err("expected x,y,width,height".to_string());
    }
    let mut values = [0u32; 4];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid crop value: {part}"))?;
    }
    Ok(CropRect {
        x: values[0],
        y: values[1],
        width: values[2],
        height: values[3],
    })
}

/// Read a file into a SourceImage, deriving the mime type from the extension.
fn read_source(path: &Path) -> Result<SourceImage, Box<dyn std::error::Error>> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let format = OutputFormat::from_extension(ext)
        .ok_or_else(|| format!("unsupported input type: {}", path.display()))?;
    let data = std::fs::read(path)?;
    Ok(SourceImage::new(data, format.mime_type()))
}

fn default_out(input: &Path, out: Option<PathBuf>, format: OutputFormat) -> PathBuf {
    out.unwrap_or_else(|| input.with_extension(format.extension()))
}

fn write_result(
    input: &Path,
    out: PathBuf,
    original_bytes: u64,
    result: &ConversionResult,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(&out, &result.bytes)?;
    for line in output::format_conversion_summary(original_bytes, result) {
        println!("{line}");
    }
    println!("{} → {}", input.display(), out.display());
    Ok(())
}

/// Collect image files directly inside `dir`, sorted by name for a
/// deterministic batch order.
fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(OutputFormat::from_extension)
                .is_some()
        })
        .collect();
    paths.sort();
    if paths.is_empty() {
        return Err(format!("no images found in {}", dir.display()).into());
    }
    Ok(paths)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let core_config = config::CoreConfig::load_or_default(cli.config.as_deref())?;
    let codec = RustCodec::new();

    match cli.command {
        Command::Convert { input, args, out } => {
            let source = read_source(&input)?;
            let request = args.to_request();
            let result = transform::convert(&codec, &source, &request)?;
            let out = default_out(&input, out, result.format);
            write_result(&input, out, source.size() as u64, &result)?;
        }
        Command::Smart { input, args, out } => {
            let source = read_source(&input)?;
            let request = args.to_request();
            let result = transform::smart_compress(
                &codec,
                &source,
                &request,
                &core_config.classifier,
            )?;
            let out = default_out(&input, out, result.format);
            write_result(&input, out, source.size() as u64, &result)?;
        }
        Command::TargetSize {
            input,
            args,
            target_kb,
            out,
        } => {
            let source = read_source(&input)?;
            let request = args.to_request();
            let target_bytes = (target_kb * 1024.0).round() as usize;
            let result =
                transform::compress_to_target_size(&codec, &source, target_bytes, &request)?;
            let out = default_out(&input, out, result.format);
            write_result(&input, out, source.size() as u64, &result)?;
            if result.size() > target_bytes {
                println!(
                    "note: closest achievable size is {} (target {})",
                    output::format_file_size(result.size() as u64),
                    output::format_file_size(target_bytes as u64)
                );
            }
        }
        Command::Edit {
            input,
            rotate,
            flip_h,
            flip_v,
            crop,
            out,
        } => {
            let source = read_source(&input)?;
            let request = EditRequest {
                rotation: rotate,
                flip_horizontal: flip_h,
                flip_vertical: flip_v,
                crop,
            };
            let result = transform::apply_encoded(&codec, &source, &request)?;
            let out = out.unwrap_or_else(|| {
                let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("edited");
                input.with_file_name(format!("{stem}-edited.{}", result.format.extension()))
            });
            write_result(&input, out, source.size() as u64, &result)?;
        }
        Command::Batch { dir, args, out_dir } => {
            let paths = collect_inputs(&dir)?;
            let mut sources = Vec::with_capacity(paths.len());
            for path in &paths {
                sources.push(read_source(path)?);
            }

            std::fs::create_dir_all(&out_dir)?;
            let request = args.to_request();

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    println!("{}", output::format_batch_event(&event));
                }
            });

            let outcome = batch::run(&codec, &sources, &request, Some(tx), None);
            printer.join().unwrap();
            let results = outcome?;

            let mut names = Vec::with_capacity(paths.len());
            for (path, result) in paths.iter().zip(&results) {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
                let name = format!("{stem}.{}", result.format.extension());
                std::fs::write(out_dir.join(&name), &result.bytes)?;
                names.push(name);
            }

            let original_sizes: Vec<u64> = sources.iter().map(|s| s.size() as u64).collect();
            let report = output::BatchReport::new(&names, &original_sizes, &results);
            let json = serde_json::to_string_pretty(&report)?;
            std::fs::write(out_dir.join("report.json"), json)?;

            let total_in: u64 = original_sizes.iter().sum();
            let total_out: u64 = results.iter().map(|r| r.size() as u64).sum();
            println!(
                "{} images: {} → {} ({}% saved)",
                results.len(),
                output::format_file_size(total_in),
                output::format_file_size(total_out),
                output::compression_ratio(total_in, total_out)
            );
        }
        Command::Frames {
            inputs,
            width,
            height,
            interval,
            out_dir,
        } => {
            if inputs.is_empty() {
                return Err("at least one frame image is required".into());
            }
            let mut sources = Vec::with_capacity(inputs.len());
            for path in &inputs {
                sources.push(read_source(path)?);
            }

            // Frame size defaults to the first input, shrunk into the
            // configured box.
            let (width, height) = match (width, height) {
                (Some(w), Some(h)) => (w, h),
                _ => {
                    let first = codec.decode(sources[0].data(), sources[0].mime())?;
                    let suggested = transform::fit_within(
                        first.width(),
                        first.height(),
                        core_config.frames.max_width,
                        core_config.frames.max_height,
                    );
                    (width.unwrap_or(suggested.0), height.unwrap_or(suggested.1))
                }
            };

            let options = FrameOptions {
                width,
                height,
                interval: interval.unwrap_or(core_config.frames.interval),
            };
            let set = transform::prepare(&codec, &sources, &options)?;

            std::fs::create_dir_all(&out_dir)?;
            for (i, frame) in set.frames.iter().enumerate() {
                let bytes = codec.encode(frame, OutputFormat::Png, Quality::default())?;
                std::fs::write(out_dir.join(format!("frame_{i:03}.png")), bytes)?;
            }
            println!(
                "{} frames at {}x{}, {}s apart → {}",
                set.len(),
                set.width,
                set.height,
                set.interval,
                out_dir.display()
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_toml());
        }
    }

    Ok(())
}
