//! Interactive operator menu.
//!
//! An explicit loop over a small state machine; every rejected input prints
//! its reason and falls back to the idle prompt, nothing recurses and
//! nothing crashes the session.

use crate::config::Config;
use crate::export::write_csv;
use crate::merge::{FfmpegConcatenator, MergePlan};
use crate::naming::NamingConvention;
use crate::probe::FfprobeProber;
use crate::registry::ClipRegistry;
use crate::rename::rename_to_canonical;
use crate::resolver::TypeResolver;
use crate::selection::select_from;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuState {
    Idle,
    AwaitingGroupChoice,
    AwaitingDateRange { group_index: usize },
}

pub struct Menu {
    config: Config,
    naming: NamingConvention,
    resolver: TypeResolver,
    directory: PathBuf,
}

impl Menu {
    pub fn new(config: Config, directory: PathBuf) -> Self {
        let naming = NamingConvention::new(&config.naming, &config.scan.media_extension);
        let resolver = TypeResolver::from_config(&config.rooms);
        Self {
            config,
            naming,
            resolver,
            directory,
        }
    }

    async fn build_registry(&self) -> std::io::Result<ClipRegistry> {
        let prober = FfprobeProber::new(Duration::from_secs(self.config.scan.probe_timeout_secs));
        ClipRegistry::build(&self.directory, &self.naming, &self.resolver, &prober).await
    }

    fn print_groups(&self, registry: &ClipRegistry) {
        let groups = registry.groups();
        if groups.is_empty() {
            println!("No classified clips in {}", self.directory.display());
            return;
        }
        for (index, group) in groups.iter().enumerate() {
            let first = group.clips.first().map(|c| c.recorded_at);
            let last = group.clips.last().map(|c| c.recorded_at);
            println!(
                "  [{}] {}: {} clips ({} ~ {})",
                index + 1,
                group.key(),
                group.clips.len(),
                first.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
                last.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            );
        }
    }

    pub async fn run(&self) -> Result<()> {
        let mut registry = self.build_registry().await?;
        let mut state = MenuState::Idle;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            match state {
                MenuState::Idle => {
                    println!();
                    println!("ClipMaster: {} clips classified", registry.len());
                    println!("  m: merge a date range   e: export CSV");
                    println!("  r: rename raw captures  s: rescan   q: quit");
                    print_prompt("> ");
                }
                MenuState::AwaitingGroupChoice => {
                    self.print_groups(&registry);
                    print_prompt("group number (empty to cancel)> ");
                }
                MenuState::AwaitingDateRange { .. } => {
                    print_prompt("date range, e.g. '2024-05-11 ~ 2024-06-14' or 'a' for all> ");
                }
            }

            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };
            let input = line.trim().to_string();

            state = match state {
                MenuState::Idle => match input.as_str() {
                    "m" => {
                        if registry.is_empty() {
                            println!("Nothing to merge, directory has no classified clips.");
                            MenuState::Idle
                        } else {
                            MenuState::AwaitingGroupChoice
                        }
                    }
                    "e" => {
                        let path = self.directory.join("clips.csv");
                        match write_csv(&registry, &path).await {
                            Ok(rows) => println!("Wrote {} rows to {}", rows, path.display()),
                            Err(e) => println!("CSV export failed: {}", e),
                        }
                        MenuState::Idle
                    }
                    "r" => {
                        let report = rename_to_canonical(&registry, &self.naming).await;
                        println!(
                            "Renamed {}, skipped {}, failed {}",
                            report.renamed, report.skipped, report.failed
                        );
                        // filenames changed, classification must be redone
                        registry = self.build_registry().await?;
                        MenuState::Idle
                    }
                    "s" => {
                        registry = self.build_registry().await?;
                        MenuState::Idle
                    }
                    "q" => break,
                    "" => MenuState::Idle,
                    other => {
                        println!("Unknown command: {}", other);
                        MenuState::Idle
                    }
                },

                MenuState::AwaitingGroupChoice => {
                    if input.is_empty() {
                        MenuState::Idle
                    } else {
                        match input.parse::<usize>() {
                            Ok(number) if number >= 1 => MenuState::AwaitingDateRange {
                                group_index: number - 1,
                            },
                            _ => {
                                println!("Not a group number: {}", input);
                                MenuState::Idle
                            }
                        }
                    }
                }

                MenuState::AwaitingDateRange { group_index } => {
                    let groups = registry.groups();
                    match select_from(&groups, group_index, &input, self.config.selection.max_clips)
                    {
                        // the selection engine guarantees at least two clips
                        Ok(selection) => match MergePlan::new(&self.naming, &selection) {
                            Some(plan) => {
                                let output_path = self.directory.join(&plan.output_name);
                                println!(
                                    "Merging {} clips into {}",
                                    plan.inputs.len(),
                                    plan.output_name
                                );

                                let concatenator = FfmpegConcatenator::new(Duration::from_secs(
                                    self.config.encoding.merge_timeout_secs,
                                ));
                                match concatenator
                                    .concatenate(&plan.inputs, &output_path, &self.config.encoding)
                                    .await
                                {
                                    Ok(()) => {
                                        println!("Merged file saved as {}", output_path.display())
                                    }
                                    Err(e) => {
                                        // this merge is aborted, the registry stays valid
                                        error!("Merge failed: {}", e);
                                        println!("Merge failed: {}", e);
                                    }
                                }
                                MenuState::Idle
                            }
                            None => MenuState::Idle,
                        },
                        Err(reason) => {
                            println!("Selection rejected: {}", reason);
                            MenuState::Idle
                        }
                    }
                }
            };
        }

        println!("Done.");
        Ok(())
    }
}

fn print_prompt(prompt: &str) {
    use std::io::Write;
    print!("{}", prompt);
    let _ = std::io::stdout().flush();
}
