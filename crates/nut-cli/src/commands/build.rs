//! Build command implementation.
//!
//! `nut build` expands the project's feature matrix and hands one build
//! context per variant to the configured engine. With `--watch` it instead
//! runs a single variant continuously until Ctrl+C.

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;
use nut_build::{
    check_command_flags, collect_entries, load_engine, render_feature_matrix, select_variants,
    BuildContextFactory, BuildEngine, BuildOverrides, CommandInput, EntryDescriptor,
    EntryLocation,
};
use nut_settings::{ProjectSettings, SettingsRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Variant watched by `nut build --watch` without `--build-target`.
const DEFAULT_WATCH_FEATURE: &str = "dev";

/// Execute the build command.
///
/// # Build Process
///
/// 1. Reject `--analyze` without `--build-target`
/// 2. Load and validate the project settings
/// 3. Select variants from the feature matrix
/// 4. Bind the engine and collect entries concurrently
/// 5. Check required dependencies, then create one context per variant
/// 6. Clean output directories if requested
/// 7. Build every variant and print a summary
///
/// # Errors
///
/// Returns errors for invalid flags or settings, unknown features, missing
/// dependencies, and failed variants.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    check_command_flags(args.analyze, args.build_target.as_deref())?;

    let cwd = utils::resolve_cwd(args.cwd.as_deref())?;
    let request = SettingsRequest::new(&cwd).with_file(args.config.clone());
    let settings = utils::load_settings(&request)?;
    if let Some(from) = &settings.from {
        debug!(path = %from.display(), "using settings file");
    }

    if args.watch {
        return watch(&args, &cwd, settings).await;
    }

    let only = args.feature_only.as_deref().or(args.build_target.as_deref());
    let excluded = &settings.build.exclude_features;
    let variants = select_variants(&settings.feature_matrix, excluded, only)?;
    ui::print_feature_matrix(&render_feature_matrix(
        &settings.feature_matrix,
        excluded,
        only,
    ));

    if variants.is_empty() {
        ui::warning("Feature matrix is empty, nothing to build");
        return Ok(());
    }

    let (engine, entries) = bind(&args, &cwd, &settings).await?;
    let factory =
        BuildContextFactory::prepare(command_input(&args, &cwd), Arc::clone(&settings), entries)
            .await?;
    let contexts = factory.create_all(&variants)?;

    if args.clean {
        let mut cleaned: Vec<PathBuf> = Vec::new();
        for ctx in &contexts {
            let out_dir = ctx.output_path();
            if !cleaned.contains(&out_dir) {
                ui::info(&format!("Cleaning output directory: {}", out_dir.display()));
                utils::clean_output_dir(&out_dir)?;
                cleaned.push(out_dir);
            }
        }
    }

    let spinner = ui::Spinner::new(&format!(
        "Building {} variant(s) with {}...",
        contexts.len(),
        engine.name()
    ));
    if let Err(e) = engine.build(&contexts).await {
        spinner.fail("Build failed");
        return Err(e.into());
    }
    spinner.finish(&format!("Built {} variant(s)", contexts.len()));

    let summary: Vec<(String, PathBuf)> = contexts
        .iter()
        .map(|ctx| (ctx.feature_name().to_string(), ctx.output_path()))
        .collect();
    let duration = start_time.elapsed();
    ui::print_build_summary(&summary, duration);
    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(duration)
    ));

    Ok(())
}

/// Continuous build of one variant until Ctrl+C.
async fn watch(args: &BuildArgs, cwd: &Path, settings: Arc<ProjectSettings>) -> Result<()> {
    let variant = args
        .build_target
        .clone()
        .unwrap_or_else(|| DEFAULT_WATCH_FEATURE.to_string());

    let (engine, entries) = bind(args, cwd, &settings).await?;
    let factory =
        BuildContextFactory::prepare(command_input(args, cwd), Arc::clone(&settings), entries)
            .await?;
    let ctx = factory.create(&variant)?;

    if args.clean {
        utils::clean_output_dir(&ctx.output_path())?;
    }

    let running = engine.watch(ctx).await?;
    ui::info(&format!(
        "Watching variant `{}` with {}. Press Ctrl+C to stop",
        variant,
        engine.name()
    ));

    tokio::signal::ctrl_c().await?;
    ui::info("Stopping build engine...");
    running.stop().await?;
    ui::success("Watch stopped");

    Ok(())
}

/// Bind the engine and collect entries concurrently.
async fn bind(
    args: &BuildArgs,
    cwd: &Path,
    settings: &ProjectSettings,
) -> Result<(Arc<dyn BuildEngine>, Arc<[EntryDescriptor]>)> {
    let location = entry_location(args, cwd);
    let (engine, entries) = tokio::try_join!(
        async {
            load_engine(&settings.build.engine, cwd)
                .await
                .map_err(CliError::from)
        },
        async { collect_entries(&location).await.map_err(CliError::from) },
    )?;

    debug!(entries = entries.len(), engine = engine.name(), "build inputs ready");
    Ok((engine, entries.into()))
}

fn entry_location(args: &BuildArgs, cwd: &Path) -> EntryLocation {
    EntryLocation {
        src_directory: args.src_dir.clone(),
        entry_directory: args.entries_dir.clone(),
        only: (!args.entries_only.is_empty()).then(|| args.entries_only.clone()),
        ..EntryLocation::new(cwd)
    }
}

fn command_input(args: &BuildArgs, cwd: &Path) -> CommandInput {
    CommandInput {
        src_directory: args.src_dir.clone(),
        clean: args.clean,
        analyze: args.analyze,
        build_target: args.build_target.clone(),
        overrides: BuildOverrides {
            public_path: args.public_path.clone(),
            out_dir: args.out_dir.clone(),
            source_maps: args.no_source_maps.then_some(false),
            defines: args.define.iter().cloned().collect(),
        },
        ..CommandInput::new(cwd, args.mode.into())
    }
}
