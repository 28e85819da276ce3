use std::time::Duration;

use chatgpt::config::ChatGPTEngine;
use chatgpt::prelude::*;
use chatgpt::types::CompletionResponse;
use log::{debug, warn};

use crate::quiz::Question;

/// Explains wrong answers with a short generated tutor reply.
pub struct QuizHelper {
    chat_gpt: ChatGPT,
}

impl QuizHelper {
    pub fn new(api_key: &str) -> Result<Self> {
        let mut chat_gpt = ChatGPT::new(api_key)?;
        chat_gpt.config.engine = ChatGPTEngine::Gpt35Turbo;
        chat_gpt.config.timeout = Duration::from_secs(15);

        Ok(Self { chat_gpt })
    }

    pub async fn explain_wrong_answer(&self, question: &Question, selected: &str) -> Result<String> {
        debug!("Generating explanation for question: {:?}", question.text);
        let prompt = format!(
            "You are EduTutor, a friendly tutor helping a student practise.
        The student was asked: \"{}\" with the options {}.
        The student answered {}, but the correct answer is {}.
        Explain briefly why the correct answer is right. Limit the reply to two sentences.",
            question.text,
            question.options.join(", "),
            selected,
            question.correct_answer
        );

        let response: CompletionResponse = self.chat_gpt.send_message(&prompt).await?;
        let content = response.message().clone().content;

        debug!("Completion: {:?}", content);

        Ok(content)
    }
}

/// Explanation for a wrong answer, falling back to stating the correct answer
/// when no helper is configured or the completion fails.
pub async fn explanation_for(helper: Option<&QuizHelper>, question: &Question, selected: &str) -> String {
    let fallback = || format!("The correct answer is {}.", question.correct_answer);

    match helper {
        Some(helper) => match helper.explain_wrong_answer(question, selected).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => fallback(),
            Err(e) => {
                warn!("Could not generate an explanation: {}", e);
                fallback()
            }
        },
        None => fallback(),
    }
}
