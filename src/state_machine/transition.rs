//! Pure state transition function

use super::keyboard::Keyboard;
use super::messages;
use super::{Action, DialogueContext, DialogueState, Effect, Event, Session};
use crate::explain::ExplanationFailure;
use crate::problems::{ProblemRecord, TaskId};

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            new_session: session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Trim and lower-case user text before matching
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Pure transition function
///
/// Given the same session, context and event it always produces the same
/// result; all I/O is described by the returned effects. Every event is
/// handled: input that fits nowhere produces a notice and leaves the
/// session untouched.
pub fn transition(session: &Session, ctx: &DialogueContext, event: Event) -> TransitionResult {
    match event {
        Event::Start { full_name } => TransitionResult::new(session.clone()).with_effect(
            Effect::reply_with(messages::welcome(&full_name), Keyboard::StartMenu),
        ),

        Event::Text { text } => handle_text(session, ctx, &text),

        Event::Action(Action::Solve) => start_solving(session, ctx),
        Event::Action(Action::ChangeTask) => choose_task(session, ctx, messages::CHOOSE_TASK),
        Event::Action(Action::Explain) => request_explanation(session, ctx),

        Event::UnknownAction { .. } => {
            TransitionResult::new(session.clone()).with_effect(Effect::reply(messages::UNKNOWN_ACTION))
        }

        Event::ExplanationReady {
            correct_answer,
            outcome,
        } => explanation_ready(session, &correct_answer, outcome),
    }
}

fn handle_text(session: &Session, ctx: &DialogueContext, text: &str) -> TransitionResult {
    let normalized = normalize(text);

    match normalized.as_str() {
        messages::BEGIN_PHRASE => choose_task(session, ctx, messages::LETS_CHOOSE),
        messages::DECLINE_PHRASE => TransitionResult::new(session.clone())
            .with_effect(Effect::reply_with(messages::FAREWELL, Keyboard::ReEntry)),
        messages::REENTRY_PHRASE => choose_task(session, ctx, messages::PICK_TASK),
        digits if session.state == DialogueState::ChoosingTask && is_task_number(digits) => {
            select_task(session, ctx, digits)
        }
        answer if session.state == DialogueState::SolvingTask => {
            check_answer(session, ctx, answer)
        }
        _ => TransitionResult::new(session.clone())
            .with_effect(Effect::reply(messages::NOT_UNDERSTOOD)),
    }
}

fn is_task_number(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

/// Show the task keyboard and wait for a number
fn choose_task(session: &Session, ctx: &DialogueContext, prompt: &str) -> TransitionResult {
    TransitionResult::new(session.with_state(DialogueState::ChoosingTask))
        .with_effect(Effect::PersistSession)
        .with_effect(Effect::reply_with(
            prompt,
            Keyboard::TaskGrid {
                max_task: ctx.max_task,
            },
        ))
}

fn select_task(session: &Session, ctx: &DialogueContext, digits: &str) -> TransitionResult {
    // Values too large for TaskId are out of range as well
    let task = match digits.parse::<TaskId>() {
        Ok(task) if (1..=ctx.max_task).contains(&task) => task,
        _ => {
            return TransitionResult::new(session.clone())
                .with_effect(Effect::reply(messages::task_out_of_range(ctx.max_task)));
        }
    };

    if ctx.bank.contains(task) {
        TransitionResult::new(Session {
            state: DialogueState::ChoosingTask,
            current_task: Some(task),
            problem_index: 0,
        })
        .with_effect(Effect::PersistSession)
        .with_effect(Effect::SendTheory { task })
        .with_effect(Effect::reply_with(messages::OFFER_SOLVING, Keyboard::SolveOffer))
    } else {
        TransitionResult::new(Session {
            state: DialogueState::ChoosingTask,
            current_task: None,
            problem_index: 0,
        })
        .with_effect(Effect::PersistSession)
        .with_effect(Effect::SendTheory { task })
        .with_effect(Effect::reply_with(
            messages::PROBLEMS_NOT_READY,
            Keyboard::TaskGrid {
                max_task: ctx.max_task,
            },
        ))
    }
}

fn start_solving(session: &Session, ctx: &DialogueContext) -> TransitionResult {
    match ctx.problems_for(session) {
        Some(problems) => present_problem(session.with_state(DialogueState::SolvingTask), problems),
        None => stale_session(),
    }
}

/// Show the problem at the session's index, or finish the task
fn present_problem(session: Session, problems: &[ProblemRecord]) -> TransitionResult {
    match problems.get(session.problem_index) {
        Some(problem) => {
            let text = messages::problem(session.problem_index, problems.len(), &problem.question);
            TransitionResult::new(session)
                .with_effect(Effect::PersistSession)
                .with_effect(Effect::reply_with(text, Keyboard::ProblemActions))
        }
        None => TransitionResult::new(Session::default())
            .with_effect(Effect::ClearSession)
            .with_effect(Effect::reply_with(messages::ALL_SOLVED, Keyboard::StartMenu)),
    }
}

fn check_answer(session: &Session, ctx: &DialogueContext, answer: &str) -> TransitionResult {
    let Some(problems) = ctx.problems_for(session) else {
        return stale_session();
    };
    let Some(problem) = problems.get(session.problem_index) else {
        return stale_session();
    };

    if normalize(&problem.answer) != answer {
        return TransitionResult::new(session.clone()).with_effect(Effect::reply(messages::WRONG));
    }

    let advanced = Session {
        problem_index: session.problem_index + 1,
        ..session.clone()
    };
    let next = present_problem(advanced, problems);
    TransitionResult::new(next.new_session)
        .with_effect(Effect::reply(messages::CORRECT))
        .with_effects(next.effects)
}

fn request_explanation(session: &Session, ctx: &DialogueContext) -> TransitionResult {
    let Some(problem) = ctx.current_problem(session) else {
        return stale_session();
    };

    if session.state != DialogueState::SolvingTask {
        return TransitionResult::new(session.clone())
            .with_effect(Effect::reply(messages::START_SOLVING_FIRST));
    }

    TransitionResult::new(session.clone())
        .with_effect(Effect::reply(messages::GENERATING))
        .with_effect(Effect::RequestExplanation {
            problem: problem.clone(),
        })
}

fn explanation_ready(
    session: &Session,
    correct_answer: &str,
    outcome: Result<String, ExplanationFailure>,
) -> TransitionResult {
    let result = TransitionResult::new(session.clone());
    match outcome {
        Ok(text) => result
            .with_effect(Effect::markdown_with(
                messages::explanation(&text, correct_answer),
                Keyboard::ExplanationActions,
            ))
            .with_effect(Effect::reply(messages::CONTINUE_PROMPT)),
        Err(failure) => result.with_effect(Effect::reply(failure_notice(&failure))),
    }
}

fn failure_notice(failure: &ExplanationFailure) -> &'static str {
    match failure {
        ExplanationFailure::Timeout(_) => messages::TIMED_OUT,
        failure if failure.is_rate_limited() => messages::RATE_LIMITED,
        _ => messages::GENERATION_FAILED,
    }
}

/// The session references a task or problem that no longer resolves:
/// reset to dormant and ask the user to pick a task again
fn stale_session() -> TransitionResult {
    TransitionResult::new(Session::default())
        .with_effect(Effect::ClearSession)
        .with_effect(Effect::reply_with(messages::SELECT_TASK_FIRST, Keyboard::StartMenu))
}
