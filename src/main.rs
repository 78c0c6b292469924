use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use tile_sheet::cli::{
    execute_add, execute_config, execute_list, execute_remove, execute_write, AddConfig, Cli,
    Commands, ConfigChanges,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Add {
            src,
            name,
            tile_width,
            tile_height,
            output_path,
            tags,
            skip_validation,
            yes,
            no_preview,
            quiet,
        } => {
            execute_add(AddConfig {
                config_path: cli.config,
                src,
                name,
                tile_width,
                tile_height,
                output_path,
                tags,
                skip_validation,
                skip_audit: yes,
                preview: !no_preview,
                quiet,
            })
            .await
        }
        Commands::List { name, no_preview } => execute_list(&cli.config, &name, !no_preview).await,
        Commands::Write { output_path, name } => {
            execute_write(&cli.config, output_path, name).await
        }
        Commands::Remove {
            name,
            indices,
            hash,
        } => execute_remove(&cli.config, &name, &indices, &hash).await,
        Commands::Config {
            db_path,
            output_path,
            empty_threshold,
            dupe_threshold,
            clear_output,
            fingerprint_in_filenames,
        } => {
            execute_config(
                &cli.config,
                ConfigChanges {
                    db_path,
                    output_path,
                    empty_threshold,
                    dupe_threshold,
                    clear_output,
                    fingerprint_in_filenames,
                },
            )
            .await
        }
    }
}
