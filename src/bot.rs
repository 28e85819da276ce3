//! Telegram frontend: feeds chat messages to the router and renders the
//! screens it returns as messages with reply keyboards.

use std::sync::Arc;

use teloxide::{
    dispatching::{dialogue::ErasedStorage, UpdateHandler},
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
    utils::command::BotCommands,
    RequestError,
};

use crate::error::{AppError, HandlerResult, QuizError};
use crate::history::QuizAttempt;
use crate::quiz::Subject;
use crate::roster::Roster;
use crate::router::{self, App, Greeting, Screen, BACK_TO_DASHBOARD, LOGIN_WITH_GOOGLE, TAKE_A_QUIZ};
use crate::session::Session;

pub type QuizDialogue = Dialogue<Session, ErasedStorage<Session>>;
pub type SessionStorage = Arc<ErasedStorage<Session>>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "start over from the login page.")]
    Start,
    #[command(description = "sign out of this chat.")]
    Logout,
    #[command(description = "show this text.")]
    Help,
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    Update::filter_message()
        .enter_dialogue::<Message, ErasedStorage<Session>, Session>()
        .branch(dptree::entry().filter_command::<Command>().endpoint(command))
        .branch(dptree::endpoint(page))
}

async fn command(bot: Bot, dialogue: QuizDialogue, app: Arc<App>, msg: Message, cmd: Command) -> HandlerResult {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start | Command::Logout => {
            if matches!(cmd, Command::Logout) {
                bot.send_message(msg.chat.id, "Signed out. See you soon!").await?;
            }
            let session = Session::default();
            let screens = router::enter(&app, &session).await;
            dialogue.update(session).await?;
            render(&bot, msg.chat.id, &screens).await?;
        }
    }
    Ok(())
}

async fn page(bot: Bot, dialogue: QuizDialogue, mut session: Session, app: Arc<App>, msg: Message) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please answer with text.").await?;
        return Ok(());
    };

    match router::dispatch(&app, &mut session, text).await {
        Ok(screens) => {
            dialogue.update(session).await?;
            render(&bot, msg.chat.id, &screens).await?;
            Ok(())
        }
        Err(e) => {
            bot.send_message(msg.chat.id, apology(&e)).await?;
            Err(e.into())
        }
    }
}

/// Message for a failed input. The session is not updated on failure, which
/// is safe because handlers only fail before changing it.
fn apology(e: &AppError) -> &'static str {
    match e {
        AppError::Quiz(QuizError::Record(_)) => "Sorry, your answer could not be saved. Please answer again.",
        AppError::Quiz(QuizError::NoActiveQuiz) => "Sorry, something went wrong. Please try again.",
    }
}

async fn render(bot: &Bot, chat: ChatId, screens: &[Screen]) -> Result<(), RequestError> {
    for screen in screens {
        let (text, keyboard) = present(screen);
        match keyboard {
            Some(keyboard) => {
                bot.send_message(chat, text).reply_markup(keyboard).await?;
            }
            None => {
                bot.send_message(chat, text).await?;
            }
        }
    }
    Ok(())
}

fn keyboard(rows: Vec<Vec<String>>) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.into_iter()
            .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
}

fn subject_keyboard() -> KeyboardMarkup {
    keyboard(vec![
        Subject::ALL.iter().map(|s| s.name().to_string()).collect(),
        vec![BACK_TO_DASHBOARD.to_string()],
    ])
}

fn history_text(history: &[QuizAttempt]) -> String {
    if history.is_empty() {
        return "No quiz history yet.".to_string();
    }

    let entries = history
        .iter()
        .map(|attempt| {
            format!(
                "[{}] {}\nYour answer: {} | Correct: {} | {}\n🕒 {}",
                attempt.subject,
                attempt.question,
                attempt.selected_option,
                attempt.correct_option,
                if attempt.is_correct { "🟢 Correct" } else { "🔴 Wrong" },
                attempt.timestamp.format("%Y-%m-%d %H:%M:%S")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("📜 Quiz history\n\n{}", entries)
}

fn present(screen: &Screen) -> (String, Option<KeyboardMarkup>) {
    match screen {
        Screen::Login { notice, external_login } => {
            let mut text = String::new();
            if let Some(notice) = notice {
                text.push_str(notice);
                text.push_str("\n\n");
            }
            text.push_str(
                "📖🔐 EduTutor AI login\n\nSend your role, optionally followed by your user ID \
                 (for example \"student alice\").",
            );
            let mut rows = vec![vec!["student".to_string(), "teacher".to_string()]];
            if *external_login {
                text.push_str(&format!("\n\nOr press \"{}\".", LOGIN_WITH_GOOGLE));
                rows.push(vec![LOGIN_WITH_GOOGLE.to_string()]);
            }
            (text, Some(keyboard(rows)))
        }
        Screen::AuthorizationLink(url) => (
            format!(
                "Open this link to log in with Google:\n{}\n\nWhen your browser lands on the redirect page, \
                 copy its full address and send it here.",
                url
            ),
            None,
        ),
        Screen::Dashboard {
            greeting,
            roster,
            history,
        } => {
            let welcome = match greeting {
                Greeting::Named { name, email } => format!("Welcome, {} ({})", name, email),
                Greeting::Manual { role, user_id } => format!("Logged in as {} - ID: {}", role, user_id),
            };
            let courses = match roster {
                Roster::NotLinked => "Sync with Google to see your classroom courses.".to_string(),
                Roster::Courses(courses) if courses.is_empty() => "No courses found.".to_string(),
                Roster::Courses(courses) => {
                    let list = courses
                        .iter()
                        .map(|c| format!("📘 {}", c))
                        .collect::<Vec<_>>()
                        .join("\n");
                    format!("Your Google Classroom courses:\n{}", list)
                }
            };
            let text = format!(
                "📚 EduTutor AI Dashboard\n\n{}\n\n{}\n\n{}",
                welcome,
                courses,
                history_text(history)
            );
            (text, Some(keyboard(vec![vec![TAKE_A_QUIZ.to_string()]])))
        }
        Screen::SubjectChoice => ("📝 Choose a subject for your quiz.".to_string(), Some(subject_keyboard())),
        Screen::Question {
            number,
            total,
            question,
        } => (
            format!("Q{}/{}: {}", number, total, question.text),
            Some(keyboard(vec![
                question.options.clone(),
                vec![BACK_TO_DASHBOARD.to_string()],
            ])),
        ),
        Screen::PickAnOption => ("Please pick one of the options.".to_string(), None),
        Screen::Verdict {
            correct: true, ..
        } => ("✅ Correct!".to_string(), None),
        Screen::Verdict { explanation, .. } => {
            let mut text = "❌ Wrong!".to_string();
            if let Some(explanation) = explanation {
                text.push_str("\n\n");
                text.push_str(explanation);
            }
            (text, None)
        }
        Screen::Completed {
            score,
            total,
            history,
        } => (
            format!(
                "🎉 Quiz completed!\nYour score: {}/{}\n\n{}\n\nPick a subject to play again.",
                score,
                total,
                history_text(history)
            ),
            Some(subject_keyboard()),
        ),
    }
}
