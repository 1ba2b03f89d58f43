//! onedrive CLI - Interact with OneDrive from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use serde_json::Value;

use onedrive_client::{ConflictBehavior, OneDriveClient, QueryParams};

/// CLI tool for interacting with OneDrive.
#[derive(Parser)]
#[command(name = "onedrive")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OAuth2 access token.
    #[arg(long, env = "ONEDRIVE_ACCESS_TOKEN")]
    token: String,

    /// Drive ID to operate on (defaults to the personal drive).
    #[arg(long)]
    drive: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all available drives.
    Drives,

    /// Show metadata for the selected drive.
    Drive,

    /// Show the drive's root folder.
    Root,

    /// List children of an item, or of the root.
    Ls {
        /// Item ID (omit for the drive root).
        item: Option<String>,
    },

    /// Get item metadata.
    Get {
        /// Item ID.
        item: String,

        /// Include the item's children in the response.
        #[arg(long)]
        children: bool,
    },

    /// Search within the drive root or a folder.
    Search {
        /// Search string.
        query: String,

        /// Item ID to search within (omit for the drive root).
        #[arg(long = "in")]
        scope: Option<String>,
    },

    /// List an item's thumbnails.
    Thumbs {
        /// Item ID.
        item: String,
    },

    /// Get a single thumbnail.
    Thumb {
        /// Item ID.
        item: String,

        /// Thumbnail ID.
        #[arg(default_value = "0")]
        id: String,
    },

    /// Create a folder.
    Mkdir {
        /// Folder name.
        name: String,

        /// Parent item ID (omit for the drive root).
        #[arg(long)]
        parent: Option<String>,

        /// Collision policy: rename, fail or replace.
        #[arg(long, default_value = "rename")]
        on_conflict: String,
    },

    /// Upload files (supports glob patterns like *.tar).
    Upload {
        /// File patterns to upload.
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Parent item ID (omit for the drive root).
        #[arg(long)]
        parent: Option<String>,

        /// Item name override (only valid for a single file).
        #[arg(long)]
        name: Option<String>,

        /// Collision policy: rename, fail or replace.
        #[arg(long, default_value = "rename")]
        on_conflict: String,
    },

    /// Download an item to the local filesystem.
    Download {
        /// Item ID to download.
        item: String,

        /// Local destination path (file or directory).
        #[arg(long, short = 't', default_value = ".")]
        to: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut client = OneDriveClient::new(cli.token);
    if let Some(drive) = &cli.drive {
        client.select_drive(drive);
    }

    match cli.command {
        Commands::Drives => {
            let drives = client
                .list_drives(QueryParams::new())
                .await
                .context("Failed to list drives")?;
            print_json(&drives)?;
        }

        Commands::Drive => {
            let drive = client
                .get_default_drive(QueryParams::new())
                .await
                .context("Failed to get drive")?;
            print_json(&drive)?;
        }

        Commands::Root => {
            let root = client
                .get_drive_root(None, QueryParams::new())
                .await
                .context("Failed to get drive root")?;
            print_json(&root)?;
        }

        Commands::Ls { item } => {
            let children = client
                .list_children(item.as_deref(), None, QueryParams::new())
                .await
                .context("Failed to list children")?;
            print_json(&children)?;
        }

        Commands::Get { item, children } => {
            let metadata = client
                .get_item(&item, children, QueryParams::new())
                .await
                .with_context(|| format!("Failed to get item: {}", item))?;
            print_json(&metadata)?;
        }

        Commands::Search { query, scope } => {
            let results = client
                .search(&query, scope.as_deref(), QueryParams::new())
                .await
                .context("Search failed")?;
            print_json(&results)?;
        }

        Commands::Thumbs { item } => {
            let thumbnails = client
                .list_thumbnails(&item, QueryParams::new())
                .await
                .with_context(|| format!("Failed to list thumbnails for: {}", item))?;
            print_json(&thumbnails)?;
        }

        Commands::Thumb { item, id } => {
            let thumbnail = client
                .get_thumbnail(&item, Some(id.as_str()), QueryParams::new())
                .await
                .with_context(|| format!("Failed to get thumbnail {} of: {}", id, item))?;
            print_json(&thumbnail)?;
        }

        Commands::Mkdir {
            name,
            parent,
            on_conflict,
        } => {
            let behavior: ConflictBehavior = on_conflict.parse()?;
            let folder = client
                .create_folder(&name, parent.as_deref(), Some(behavior), QueryParams::new())
                .await
                .with_context(|| format!("Failed to create folder: {}", name))?;
            print_json(&folder)?;
        }

        Commands::Upload {
            patterns,
            parent,
            name,
            on_conflict,
        } => {
            let behavior: ConflictBehavior = on_conflict.parse()?;

            // Expand glob patterns; unmatched patterns fall back to literal
            // paths.
            let mut files_to_upload: Vec<PathBuf> = Vec::new();
            for pattern in &patterns {
                let matches: Vec<PathBuf> = glob(pattern)
                    .with_context(|| format!("Invalid glob pattern: {}", pattern))?
                    .filter_map(|r| r.ok())
                    .filter(|p| p.is_file())
                    .collect();

                if matches.is_empty() {
                    let path = PathBuf::from(pattern);
                    if path.is_file() {
                        files_to_upload.push(path);
                    } else {
                        eprintln!("Warning: No files matched pattern: {}", pattern);
                    }
                } else {
                    files_to_upload.extend(matches);
                }
            }

            files_to_upload.sort();
            files_to_upload.dedup();

            if files_to_upload.is_empty() {
                anyhow::bail!("No files to upload");
            }
            if name.is_some() && files_to_upload.len() > 1 {
                anyhow::bail!("--name can only be used with a single file");
            }

            println!("Uploading {} file(s)...", files_to_upload.len());

            for (idx, file_path) in files_to_upload.iter().enumerate() {
                let filename = file_path.file_name().unwrap_or_default().to_string_lossy();
                print!(
                    "[{}/{}] Uploading {}... ",
                    idx + 1,
                    files_to_upload.len(),
                    filename
                );

                match client
                    .upload_file(file_path, name.as_deref(), parent.as_deref(), Some(behavior))
                    .await
                {
                    Ok(item) => {
                        let id = item.get("id").and_then(Value::as_str).unwrap_or("-");
                        println!("OK ({})", id);
                    }
                    Err(e) => {
                        println!("FAILED");
                        eprintln!("  Error: {}", e);
                    }
                }
            }

            println!("Done.");
        }

        Commands::Download { item, to } => {
            // Ensure destination directory exists
            if to.is_dir() || to.to_string_lossy().ends_with('/') {
                std::fs::create_dir_all(&to)
                    .with_context(|| format!("Failed to create directory: {:?}", to))?;
            } else if let Some(parent) = to.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create directory: {:?}", parent))?;
                }
            }

            print!("Downloading {}... ", item);

            let saved_to = client
                .download_item(&item, &to)
                .await
                .with_context(|| format!("Failed to download item: {}", item))?;

            println!("OK");
            println!("Saved to: {:?}", saved_to);
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
