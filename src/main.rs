mod bot;
mod config;
mod error;
mod history;
mod identity;
mod quiz;
mod roster;
mod router;
mod session;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use dotenv::dotenv;
use log::{info, warn};
use teloxide::{
    dispatching::dialogue::{InMemStorage, Storage},
    prelude::*,
    utils::command::BotCommands,
};

use bot::{Command, SessionStorage};
use config::Config;
use history::SqliteHistory;
use identity::google::{ClientSecret, GoogleIdentity};
use identity::IdentityProvider;
use quiz::ai_helper::QuizHelper;
use roster::ClassroomRoster;
use router::App;
use session::Session;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    pretty_env_logger::init();
    info!("Starting EduTutor bot...");

    let config = Config::from_env()?;

    info!("Opening quiz history at {}", config.database_url);
    let history = SqliteHistory::open(&config.database_url).await?;

    let app = Arc::new(App {
        history: Arc::new(history),
        identity: google_identity(&config),
        roster: Arc::new(ClassroomRoster::new()?),
        helper: quiz_helper(&config),
    });

    let bot = Bot::from_env();
    bot.set_my_commands(Command::bot_commands()).await?;

    let storage: SessionStorage = InMemStorage::<Session>::new().erase();

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![storage, app])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn google_identity(config: &Config) -> Option<Arc<dyn IdentityProvider>> {
    let provider = ClientSecret::load(&config.client_secret_path)
        .and_then(|secret| GoogleIdentity::new(secret, config.redirect_uri.clone()));

    match provider {
        Ok(provider) => {
            info!("Google login enabled");
            Some(Arc::new(provider))
        }
        Err(e) => {
            warn!(
                "Google login disabled ({}): {}",
                config.client_secret_path.display(),
                e
            );
            None
        }
    }
}

fn quiz_helper(config: &Config) -> Option<QuizHelper> {
    let key = config.chatgpt_api_key.as_deref()?;
    match QuizHelper::new(key) {
        Ok(helper) => {
            info!("Answer explanations enabled");
            Some(helper)
        }
        Err(e) => {
            warn!("Answer explanations disabled: {}", e);
            None
        }
    }
}
