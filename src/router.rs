//! Page handlers. Each one reads the chat's session, applies the user's
//! input and answers with the screens to show; rendering lives in `bot`.

use std::sync::Arc;

use log::{debug, error, info, warn};
use url::Url;

use crate::error::AppError;
use crate::history::{AttemptLog, QuizAttempt, DEFAULT_HISTORY_LIMIT};
use crate::identity::{self, IdentityProvider, Role};
use crate::quiz::ai_helper::{self, QuizHelper};
use crate::quiz::{Question, Quiz, Subject};
use crate::roster::{self, Roster, RosterSource};
use crate::session::{Page, Session};

pub const LOGIN_WITH_GOOGLE: &str = "Login with Google";
pub const TAKE_A_QUIZ: &str = "Take a Quiz";
pub const BACK_TO_DASHBOARD: &str = "Back to Dashboard";

/// Collaborators shared by every chat.
pub struct App {
    pub history: Arc<dyn AttemptLog>,
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub roster: Arc<dyn RosterSource>,
    pub helper: Option<QuizHelper>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Greeting {
    /// Signed in through the identity provider.
    Named { name: String, email: String },
    Manual { role: Role, user_id: String },
}

#[derive(Debug, Clone)]
pub enum Screen {
    Login {
        notice: Option<String>,
        external_login: bool,
    },
    AuthorizationLink(Url),
    Dashboard {
        greeting: Greeting,
        roster: Roster,
        history: Vec<QuizAttempt>,
    },
    SubjectChoice,
    Question {
        number: usize,
        total: usize,
        question: Question,
    },
    PickAnOption,
    Verdict {
        correct: bool,
        explanation: Option<String>,
    },
    Completed {
        score: usize,
        total: usize,
        history: Vec<QuizAttempt>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    Manual { role: Role, user_id: String },
    StartExternal,
    Redirect { code: String, state: Option<String> },
    Unknown,
}

impl LoginAction {
    /// Accepts `<role> [user id]`, the Google button, or a pasted http(s)
    /// redirect URL carrying a `code` parameter.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case(LOGIN_WITH_GOOGLE) {
            return LoginAction::StartExternal;
        }

        if let Some(url) = Url::parse(text)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
        {
            let mut code = None;
            let mut state = None;
            for (key, value) in url.query_pairs() {
                match key.as_ref() {
                    "code" => code = Some(value.into_owned()),
                    "state" => state = Some(value.into_owned()),
                    _ => {}
                }
            }
            return match code {
                Some(code) => LoginAction::Redirect { code, state },
                None => LoginAction::Unknown,
            };
        }

        let (role, user_id) = match text.split_once(char::is_whitespace) {
            Some((role, user_id)) => (role, user_id),
            None => (text, ""),
        };
        match Role::parse(role) {
            Some(role) => LoginAction::Manual {
                role,
                user_id: user_id.trim().to_string(),
            },
            None => LoginAction::Unknown,
        }
    }
}

/// Dispatches `text` to the handler of the session's current page.
pub async fn dispatch(app: &App, session: &mut Session, text: &str) -> Result<Vec<Screen>, AppError> {
    match session.page {
        Page::Login => login(app, session, text).await,
        Page::Dashboard => dashboard(app, session, text).await,
        Page::Quiz => quiz(app, session, text).await,
    }
}

/// Screens for a session that just landed on its current page.
pub async fn enter(app: &App, session: &Session) -> Vec<Screen> {
    match session.page {
        Page::Login => vec![login_screen(app, None)],
        Page::Dashboard => vec![dashboard_screen(app, session).await],
        Page::Quiz => vec![quiz_screen(&session.quiz)],
    }
}

fn login_screen(app: &App, notice: Option<String>) -> Screen {
    Screen::Login {
        notice,
        external_login: app.identity.is_some(),
    }
}

async fn login(app: &App, session: &mut Session, text: &str) -> Result<Vec<Screen>, AppError> {
    match LoginAction::parse(text) {
        LoginAction::Manual { role, user_id } => {
            let identity = identity::resolve_manual(role, &user_id);
            info!("{} signed in as {}", identity.user_id, identity.role);
            session.sign_in(identity, None);
            Ok(vec![dashboard_screen(app, session).await])
        }
        LoginAction::StartExternal => {
            let Some(provider) = &app.identity else {
                return Ok(vec![login_screen(
                    app,
                    Some("Google login is not available right now.".to_string()),
                )]);
            };
            let state = identity::new_login_state();
            let url = provider.authorization_url(&state);
            session.pending_login = Some(state);
            Ok(vec![Screen::AuthorizationLink(url)])
        }
        LoginAction::Redirect { code, state } => {
            let (Some(provider), Some(expected)) = (&app.identity, session.pending_login.take()) else {
                return Ok(vec![login_screen(
                    app,
                    Some(format!("Press \"{}\" first.", LOGIN_WITH_GOOGLE)),
                )]);
            };
            match identity::resolve_external(provider.as_ref(), &code, state.as_deref(), &expected).await {
                Ok((identity, token)) => {
                    session.sign_in(identity, Some(token));
                    Ok(vec![dashboard_screen(app, session).await])
                }
                Err(e) => {
                    warn!("Google login failed: {}", e);
                    Ok(vec![login_screen(app, Some(format!("Google login failed: {}", e)))])
                }
            }
        }
        LoginAction::Unknown => Ok(vec![login_screen(app, None)]),
    }
}

/// Recent attempts for a screen. A failed read shows as an empty history so
/// it never undoes a login or an answer that already went through.
async fn recent_history(app: &App, user_id: &str) -> Vec<QuizAttempt> {
    match app.history.recent_for(user_id, DEFAULT_HISTORY_LIMIT).await {
        Ok(history) => history,
        Err(e) => {
            warn!("Could not load quiz history of {}: {}", user_id, e);
            Vec::new()
        }
    }
}

async fn dashboard_screen(app: &App, session: &Session) -> Screen {
    let greeting = if session.display_name.is_empty() {
        Greeting::Manual {
            role: session.role,
            user_id: session.user_id.clone(),
        }
    } else {
        Greeting::Named {
            name: session.display_name.clone(),
            email: session.email.clone(),
        }
    };
    let roster = roster::fetch_roster(app.roster.as_ref(), session.credentials.as_ref()).await;
    let history = recent_history(app, &session.user_id).await;

    Screen::Dashboard {
        greeting,
        roster,
        history,
    }
}

async fn dashboard(app: &App, session: &mut Session, text: &str) -> Result<Vec<Screen>, AppError> {
    if text.trim().eq_ignore_ascii_case(TAKE_A_QUIZ) {
        session.page = Page::Quiz;
        return Ok(vec![quiz_screen(&session.quiz)]);
    }

    Ok(vec![dashboard_screen(app, session).await])
}

fn question_screen(quiz: &Quiz) -> Option<Screen> {
    quiz.current().map(|question| Screen::Question {
        number: quiz.current_question + 1,
        total: quiz.total(),
        question: question.clone(),
    })
}

fn quiz_screen(quiz: &Quiz) -> Screen {
    question_screen(quiz).unwrap_or(Screen::SubjectChoice)
}

async fn quiz(app: &App, session: &mut Session, text: &str) -> Result<Vec<Screen>, AppError> {
    let text = text.trim();

    if text.eq_ignore_ascii_case(BACK_TO_DASHBOARD) {
        session.page = Page::Dashboard;
        return Ok(vec![dashboard_screen(app, session).await]);
    }

    let is_option = session
        .quiz
        .current()
        .map_or(false, |question| question.has_option(text));
    if is_option {
        return submit(app, session, text).await;
    }

    if let Some(subject) = Subject::parse(text) {
        debug!("{} started a {} quiz", session.user_id, subject);
        session.quiz = Quiz::generate(subject);
        return Ok(vec![quiz_screen(&session.quiz)]);
    }

    match question_screen(&session.quiz) {
        Some(question) => Ok(vec![Screen::PickAnOption, question]),
        None => Ok(vec![Screen::SubjectChoice]),
    }
}

async fn submit(app: &App, session: &mut Session, selected: &str) -> Result<Vec<Screen>, AppError> {
    let submission = match session
        .quiz
        .submit(&session.user_id, app.history.as_ref(), selected)
        .await
    {
        Ok(submission) => submission,
        Err(e) => {
            error!("Could not save an answer of {}: {}", session.user_id, e);
            return Err(e.into());
        }
    };

    let explanation = if submission.is_correct {
        None
    } else {
        Some(ai_helper::explanation_for(app.helper.as_ref(), &submission.question, &submission.selected).await)
    };
    let mut screens = vec![Screen::Verdict {
        correct: submission.is_correct,
        explanation,
    }];

    if !submission.is_last {
        screens.push(quiz_screen(&session.quiz));
        return Ok(screens);
    }

    let score = session.quiz.score;
    let total = session.quiz.total();
    info!("{} finished a quiz with {}/{}", session.user_id, score, total);
    session.quiz.reset();

    let history = recent_history(app, &session.user_id).await;
    screens.push(Screen::Completed {
        score,
        total,
        history,
    });
    Ok(screens)
}
