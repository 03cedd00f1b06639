use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mediainfo::{
    ALL_STREAMS, InfoKind, MediaInfoLibrary, MediaMetadata, MediaProbe, Parameter, Session,
    SessionConfig, StreamKind,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  mediainfo-probe metadata input.mp4 --json\n  mediainfo-probe get input.mp4 video 0 Width\n  mediainfo-probe count input.mkv audio\n  mediainfo-probe --option Complete=1 inform input.mkv\n  mediainfo-probe validate *.mp4 --progress\n  mediainfo-probe completions zsh > _mediainfo-probe";

#[derive(Debug, Parser)]
#[command(
    name = "mediainfo-probe",
    version,
    about = "Inspect media files with the MediaInfo library",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long, global = true)]
    progress: bool,

    /// Load the MediaInfo library from this path instead of searching for it.
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Set a MediaInfo option on every session (NAME=VALUE, repeatable).
    #[arg(long = "option", value_name = "NAME=VALUE", global = true)]
    options: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print a metadata summary for a media file (alias: probe).
    #[command(
        about = "Print media metadata",
        visible_alias = "probe",
        visible_alias = "info",
        after_help = "Examples:\n  mediainfo-probe metadata input.mp4\n  mediainfo-probe metadata input.mp4 --json"
    )]
    Metadata {
        /// Input media path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the library's full report for a media file.
    #[command(
        about = "Print the full MediaInfo report",
        after_help = "Examples:\n  mediainfo-probe inform input.mkv\n  mediainfo-probe --option Inform=XML inform input.mkv"
    )]
    Inform {
        /// Input media path.
        input: PathBuf,
    },

    /// Look up one parameter of one stream.
    #[command(
        about = "Look up a single parameter",
        after_help = "Examples:\n  mediainfo-probe get input.mp4 general 0 Duration\n  mediainfo-probe get input.mp4 video 0 Width --info measure\n  mediainfo-probe get input.mp4 audio 0 12"
    )]
    Get {
        /// Input media path.
        input: PathBuf,
        /// Stream kind: general, video, audio, text, chapters, image, menu.
        kind: StreamKind,
        /// Stream number within the kind, starting at 0.
        number: usize,
        /// Parameter name, or a numeric parameter position.
        parameter: String,
        /// Facet to return (name, text, measure, options, name_text, measure_text, info, howto, domain).
        #[arg(long, default_value = "text")]
        info: InfoKind,
        /// Facet to search the parameter name in.
        #[arg(long, default_value = "name")]
        search: InfoKind,
    },

    /// Count streams of a kind, or parameters of one stream.
    #[command(
        about = "Count streams or parameters",
        after_help = "Examples:\n  mediainfo-probe count input.mkv audio\n  mediainfo-probe count input.mkv video --number 0"
    )]
    Count {
        /// Input media path.
        input: PathBuf,
        /// Stream kind: general, video, audio, text, chapters, image, menu.
        kind: StreamKind,
        /// Count the parameters of this stream instead of the streams.
        #[arg(long)]
        number: Option<usize>,
    },

    /// Query or set a library option.
    #[command(
        name = "option",
        about = "Query or set a library option",
        after_help = "Examples:\n  mediainfo-probe option Info_Version\n  mediainfo-probe option Info_Parameters"
    )]
    LibraryOption {
        /// Option name.
        name: String,
        /// Value to set. Omit to query.
        value: Option<String>,
    },

    /// Print the native library version.
    #[command(about = "Print the MediaInfo library version")]
    Version,

    /// Check media files for structural issues.
    #[command(
        about = "Validate media files",
        after_help = "Examples:\n  mediainfo-probe validate input.mp4\n  mediainfo-probe validate a.mp4 b.mkv --progress"
    )]
    Validate {
        /// Input media paths.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_option_pair(value: &str) -> Result<(String, String), Box<dyn std::error::Error>> {
    let (name, option_value) = value
        .split_once('=')
        .ok_or(format!("invalid --option (expected NAME=VALUE): {value}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid --option (empty name): {value}").into());
    }
    Ok((name.to_string(), option_value.to_string()))
}

fn parse_parameter(value: &str) -> Parameter<'_> {
    match value.parse::<usize>() {
        Ok(index) => Parameter::Index(index),
        Err(_) => Parameter::Name(value),
    }
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn session_config(global: &GlobalOptions) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = SessionConfig::from_env();
    if let Some(path) = &global.library {
        config = config.with_library_path(path);
    }
    for pair in &global.options {
        let (name, value) = parse_option_pair(pair)?;
        config = config.with_option(name, value);
    }
    Ok(config)
}

fn open_session(
    config: &SessionConfig,
    input: &Path,
) -> Result<Session, Box<dyn std::error::Error>> {
    let mut session = Session::try_from_config(config)?;
    if !session.open(input)? {
        return Err(format!("MediaInfo could not open {}", input.display()).into());
    }
    Ok(session)
}

fn metadata_json(metadata: &MediaMetadata) -> serde_json::Value {
    json!({
        "format": metadata.format,
        "source": format!("{:?}", metadata.source),
        "duration_seconds": metadata.duration.map(|duration| duration.as_secs_f64()),
        "overall_bit_rate": metadata.overall_bit_rate,
        "file_size": metadata.file_size,
        "tags": metadata.tags,
        "video": metadata.video.iter().map(|video| json!({
            "track_index": video.track_index,
            "codec": video.codec,
            "width": video.width,
            "height": video.height,
            "frame_rate": video.frame_rate,
            "bit_rate": video.bit_rate,
            "bit_depth": video.bit_depth,
        })).collect::<Vec<_>>(),
        "audio": metadata.audio.iter().map(|audio| json!({
            "track_index": audio.track_index,
            "codec": audio.codec,
            "channels": audio.channels,
            "sample_rate": audio.sample_rate,
            "bit_rate": audio.bit_rate,
            "language": audio.language,
        })).collect::<Vec<_>>(),
        "text": metadata.text.iter().map(|text| json!({
            "track_index": text.track_index,
            "codec": text.codec,
            "language": text.language,
        })).collect::<Vec<_>>(),
        "chapter_count": metadata.chapter_count,
        "image_count": metadata.image_count,
        "menu_count": metadata.menu_count,
    })
}

fn print_metadata(metadata: &MediaMetadata) {
    println!("Format: {}", metadata.format);
    match metadata.duration {
        Some(duration) => println!("Duration: {:.3}s", duration.as_secs_f64()),
        None => println!("Duration: unknown"),
    }
    if let Some(bit_rate) = metadata.overall_bit_rate {
        println!("Overall bit rate: {bit_rate} b/s");
    }
    if let Some(file_size) = metadata.file_size {
        println!("File size: {file_size} bytes");
    }
    for (key, value) in &metadata.tags {
        println!("{key}: {value}");
    }
    for video in &metadata.video {
        println!(
            "Video #{}: {} {}x{} @ {:.3} fps",
            video.track_index, video.codec, video.width, video.height, video.frame_rate
        );
    }
    for audio in &metadata.audio {
        println!(
            "Audio #{}: {} {} Hz, {} channel(s){}",
            audio.track_index,
            audio.codec,
            audio.sample_rate,
            audio.channels,
            audio
                .language
                .as_deref()
                .map(|language| format!(" [{language}]"))
                .unwrap_or_default()
        );
    }
    for text in &metadata.text {
        println!(
            "Text #{}: {}{}",
            text.track_index,
            text.codec,
            text.language
                .as_deref()
                .map(|language| format!(" [{language}]"))
                .unwrap_or_default()
        );
    }
    if metadata.chapter_count > 0 {
        println!("Chapters: {}", metadata.chapter_count);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);
    let config = session_config(&cli.global)?;

    match cli.command {
        Commands::Metadata { input, json } => {
            let metadata = MediaProbe::probe_with_config(&input, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&metadata_json(&metadata))?);
            } else {
                print_metadata(&metadata);
            }
        }
        Commands::Inform { input } => {
            let mut session = open_session(&config, &input)?;
            print!("{}", session.inform()?);
            session.close()?;
            session.dispose()?;
        }
        Commands::Get {
            input,
            kind,
            number,
            parameter,
            info,
            search,
        } => {
            let mut session = open_session(&config, &input)?;
            let value = match parse_parameter(&parameter) {
                Parameter::Name(name) => session.get_with(kind, number, name, info, search)?,
                Parameter::Index(index) => session.get_indexed_info(kind, number, index, info)?,
            };
            if value.is_empty() && cli.global.verbose {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("no value for {kind} #{number} {parameter}").yellow()
                );
            }
            println!("{value}");
            session.dispose()?;
        }
        Commands::Count {
            input,
            kind,
            number,
        } => {
            let mut session = open_session(&config, &input)?;
            let count = session.count_in(kind, number.unwrap_or(ALL_STREAMS))?;
            println!("{count}");
            session.dispose()?;
        }
        Commands::LibraryOption { name, value } => {
            let library = MediaInfoLibrary::load(&config)?;
            let answer =
                Session::option_static_with(&library, &name, value.as_deref().unwrap_or(""))?;
            println!("{answer}");
        }
        Commands::Version => {
            let mut session = Session::try_from_config(&config)?;
            println!("{}", session.version()?);
            session.dispose()?;
        }
        Commands::Validate { inputs } => {
            let mut session = Session::from_config(&config);
            if !session.is_valid() {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "MediaInfo library unavailable; results come from the fallback method"
                        .yellow()
                );
            }

            let progress_bar = if cli.global.progress {
                let pb = ProgressBar::new(inputs.len() as u64);
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?;
                pb.set_style(style.progress_chars("##-"));
                Some(pb)
            } else {
                None
            };

            let mut failures = 0_usize;
            for input in &inputs {
                let outcome = MediaProbe::probe_with_session(&mut session, input);

                if let Some(pb) = &progress_bar {
                    pb.inc(1);
                }

                println!("{}", input.display().to_string().bold());
                match outcome {
                    Ok(metadata) => {
                        let report = metadata.validate();
                        if !report.is_valid() {
                            failures += 1;
                        }
                        print!("{report}");
                    }
                    Err(error) => {
                        failures += 1;
                        println!("[ERROR] {error}");
                    }
                }
            }

            if let Some(pb) = progress_bar {
                pb.finish_with_message("done");
            }
            if session.is_valid() {
                session.dispose()?;
            }

            if failures > 0 {
                return Err(format!("{failures} of {} file(s) failed validation", inputs.len()).into());
            }
            println!(
                "{} {}",
                "success:".green().bold(),
                format!("{} file(s) passed validation", inputs.len()).green()
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(
                shell,
                &mut command,
                "mediainfo-probe",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
