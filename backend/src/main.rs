//! Codelab CLI - Classroom roster export
//!
//! # Main Commands
//!
//! ```bash
//! codelab run a.csv b.csv -d out          # Export then upload to Google Drive
//! codelab export a.csv b.csv -d out       # Write students.jsonl + roster.csv
//! codelab upload out --folder-name 4B     # Upload a folder to Google Drive
//! ```
//!
//! # Step Commands
//!
//! ```bash
//! codelab combine a.csv b.csv             # Merge two rosters
//! codelab emails roster.csv               # Add unique Email column
//! codelab filter roster.csv -g Female     # Keep one gender
//! ```

use clap::{Parser, Subcommand};
use codelab::{
    assign_emails, combine, gender_table, load_roster, parser::roster_to_csv_string, run_export,
    upload_output, write_roster_csv, DriveClient, DriveConfig, ExportOptions, Table,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "codelab")]
#[command(about = "Merge student rosters, generate emails and export to Google Drive", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine two rosters (A rows then B rows)
    Combine {
        /// First roster CSV
        roster_a: PathBuf,
        /// Second roster CSV
        roster_b: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add a unique Email column generated from student names
    Emails {
        /// Roster CSV
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep only students of one gender
    Filter {
        /// Roster CSV
        input: PathBuf,
        /// Exact gender value, e.g. "Female"
        #[arg(short, long)]
        gender: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build export records and write them to a folder
    Export {
        #[command(flatten)]
        args: ExportArgs,
    },

    /// Upload every file of a folder to Google Drive
    Upload {
        #[command(flatten)]
        args: UploadArgs,
    },

    /// Export, then upload the output folder
    Run {
        #[command(flatten)]
        export: ExportArgs,
        /// Remote folder name (default: output folder name)
        #[arg(long)]
        folder_name: Option<String>,
        /// Parent folder id (default: GOOGLE_DRIVE_PARENT_ID)
        #[arg(long)]
        parent: Option<String>,
    },
}

#[derive(clap::Args)]
struct ExportArgs {
    /// First roster CSV
    roster_a: PathBuf,
    /// Second roster CSV
    roster_b: PathBuf,
    /// Output folder
    #[arg(short = 'd', long)]
    output_dir: PathBuf,
    /// Keep only this gender
    #[arg(short, long)]
    gender: Option<String>,
    /// Shuffle seed for a reproducible order
    #[arg(long)]
    seed: Option<u64>,
    /// Skip schema validation
    #[arg(long)]
    no_validate: bool,
}

#[derive(clap::Args)]
struct UploadArgs {
    /// Folder to upload
    folder: PathBuf,
    /// Remote folder name (default: local folder name)
    #[arg(long)]
    folder_name: Option<String>,
    /// Parent folder id (default: GOOGLE_DRIVE_PARENT_ID)
    #[arg(long)]
    parent: Option<String>,
}

impl ExportArgs {
    fn options(&self) -> ExportOptions {
        ExportOptions {
            gender: self.gender.clone(),
            seed: self.seed,
            skip_validation: self.no_validate,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Combine {
            roster_a,
            roster_b,
            output,
        } => cmd_combine(&roster_a, &roster_b, output.as_deref()),

        Commands::Emails { input, output } => cmd_emails(&input, output.as_deref()),

        Commands::Filter {
            input,
            gender,
            output,
        } => cmd_filter(&input, &gender, output.as_deref()),

        Commands::Export { args } => cmd_export(&args),

        Commands::Upload { args } => {
            cmd_upload(&args.folder, args.folder_name.as_deref(), args.parent.as_deref()).await
        }

        Commands::Run {
            export,
            folder_name,
            parent,
        } => {
            let exported = cmd_export(&export);
            match exported {
                Ok(()) => {
                    cmd_upload(&export.output_dir, folder_name.as_deref(), parent.as_deref()).await
                }
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_combine(
    roster_a: &Path,
    roster_b: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Combining: {} + {}", roster_a.display(), roster_b.display());

    let a = load_roster(roster_a)?;
    let b = load_roster(roster_b)?;
    let combined = combine(&a.table, &b.table);

    eprintln!("   Rows: {} + {} = {}", a.table.len(), b.table.len(), combined.len());
    eprintln!("   Columns: {}", combined.headers().join(", "));

    write_output(&combined, output)
}

fn cmd_emails(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📧 Generating emails: {}", input.display());

    let roster = load_roster(input)?;
    let table = assign_emails(&roster.table);
    eprintln!("✅ {} emails", table.len());

    write_output(&table, output)
}

fn cmd_filter(
    input: &Path,
    gender: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔎 Filtering {} by gender '{}'", input.display(), gender);

    let roster = load_roster(input)?;
    let table = gender_table(&roster.table, gender);
    eprintln!("✅ {} of {} rows", table.len(), roster.table.len());

    write_output(&table, output)
}

fn cmd_export(args: &ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!(
        "📄 Exporting: {} + {}",
        args.roster_a.display(),
        args.roster_b.display()
    );

    let summary = run_export(&args.roster_a, &args.roster_b, &args.output_dir, &args.options())?;

    eprintln!("\n⚙️  Combined: {} rows", summary.combined_rows);
    eprintln!("   Exported: {} records", summary.exported);
    eprintln!("   Special-character names: {}", summary.special_names);
    eprintln!("   💾 {}", summary.jsonl_path.display());
    eprintln!("   💾 {}", summary.csv_path.display());
    eprintln!("\n✨ Done!");
    Ok(())
}

async fn cmd_upload(
    folder: &Path,
    folder_name: Option<&str>,
    parent: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = DriveConfig::from_env()?;
    let client = DriveClient::from_config(&config);

    let name = folder_name.map(str::to_string).unwrap_or_else(|| {
        folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "codelab".to_string())
    });
    let parent = parent.or(config.parent_id.as_deref());

    eprintln!("📤 Uploading {} to Google Drive folder '{}'", folder.display(), name);

    let summary = upload_output(folder, &client, &name, parent).await?;

    eprintln!("\n✅ Uploaded {} files into {}", summary.files.len(), summary.folder_id);
    Ok(())
}

fn write_output(table: &Table, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            write_roster_csv(table, p)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            print!("{}", roster_to_csv_string(table)?);
        }
    }
    Ok(())
}
