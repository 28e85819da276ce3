use crate::quiz;

const QUESTIONS_PER_ROUND: u32 = 3;

/// Builds the fixed arithmetic round. Every subject gets the same questions.
///
/// Question `i` asks for `i+i` and offers `[i+1, i+2, i+i, i*2]`, so the
/// correct answer always appears more than once.
pub fn round() -> Vec<quiz::Question> {
    (1..=QUESTIONS_PER_ROUND).map(generate_question).collect()
}

fn generate_question(i: u32) -> quiz::Question {
    let answer = (i + i).to_string();
    let options = vec![
        (i + 1).to_string(),
        (i + 2).to_string(),
        answer.clone(),
        (i * 2).to_string(),
    ];

    quiz::Question::new(format!("What is {}+{}?", i, i), options, answer)
}
