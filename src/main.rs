#![forbid(unsafe_code)]

mod commands;
mod events;
mod leveling;
mod models;
mod plugins;
mod poise_error_handler;
mod repository;
mod utils;

use std::{process::exit, sync::Arc, time::Duration};

use leveling::AwardPipeline;
use plugins::Plugin;
use poise::{serenity_prelude::*, Framework};
use poise_error_handler::handle_error;
use repository::{ExpRepository, GuildConfigRepository, STORAGE_TIMEOUT};
use serde::Deserialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::{select, signal};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct AppConfig {
    discord_bot_token: String,
    database_url: String,
    register_commands_globally: Option<bool>,
    register_commands_in_guilds: Option<Vec<u64>>,
    storage_timeout_seconds: Option<u64>,
    plugins: Option<Vec<Plugin>>,
}

impl AppConfig {
    fn storage_timeout(&self) -> Duration {
        self.storage_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(STORAGE_TIMEOUT)
    }

    fn plugins(&self) -> Vec<Plugin> {
        self.plugins.clone().unwrap_or_else(Plugin::all)
    }
}

pub struct BotState {
    pub exp_repository: Arc<ExpRepository>,
    pub guild_config_repository: Arc<GuildConfigRepository>,
    /// `None` when the experience plugin is disabled.
    pub award_pipeline: Option<Arc<AwardPipeline>>,
}

#[tracing::instrument]
#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "levelling_bot=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    let storage_timeout = app_config.storage_timeout();
    let plugins = app_config.plugins();
    info!(
        "Enabled plugins: {}",
        plugins
            .iter()
            .map(Plugin::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let db_pool = match setup_database(&app_config.database_url, storage_timeout).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Could not setup database: {err}");
            exit(255);
        }
    };

    let exp_repository = Arc::new(ExpRepository::new(db_pool.clone(), storage_timeout));
    let guild_config_repository =
        Arc::new(GuildConfigRepository::new(db_pool.clone(), storage_timeout));

    let award_pipeline = plugins.contains(&Plugin::Experience).then(|| {
        Arc::new(AwardPipeline::new(
            exp_repository.clone(),
            guild_config_repository.clone(),
        ))
    });

    let app_state = BotState {
        exp_repository,
        guild_config_repository,
        award_pipeline,
    };

    let framework = Framework::builder()
        .options(poise::FrameworkOptions {
            commands: plugins::enabled_commands(&plugins),
            on_error: |error| Box::pin(handle_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handle_event(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(
                async move {
                    let commands = &framework.options().commands;

                    if let Some(true) = app_config.register_commands_globally {
                        info!("Registering commands globally");
                        poise::builtins::register_globally(ctx, commands).await?;
                    }

                    if let Some(guilds) = app_config.register_commands_in_guilds {
                        for guild in guilds.iter().map(|g| GuildId::new(*g)) {
                            let guild_name = ctx
                                .http()
                                .get_guild(guild)
                                .await
                                .map(|g| g.name)
                                .unwrap_or("???".to_string());

                            info!("Registering commands in guild {guild} ({guild_name})");

                            poise::builtins::register_in_guild(ctx, commands, guild).await?;
                        }
                    }

                    Ok(app_state)
                }
                .instrument(info_span!("bot_setup")),
            )
        })
        .build();

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES;

    let mut client = match ClientBuilder::new(app_config.discord_bot_token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to create the client: {err}");
            exit(255);
        }
    };

    select! {
        _ = signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
            client.shard_manager.shutdown_all().await;
            db_pool.close().await;
        },

        result = client.start() => {
            if let Err(err) = result {
                error!("Failed to start the client: {err}");
            }
        },
    };
}

#[tracing::instrument(skip(url))]
async fn setup_database(url: &str, acquire_timeout: Duration) -> anyhow::Result<SqlitePool> {
    info!("Connecting to SQLite database at {url}");
    let pool = SqlitePoolOptions::new()
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await?;
    info!("Running migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Done!");
    Ok(pool)
}
