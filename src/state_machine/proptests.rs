//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::{normalize, transition};
use super::*;
use crate::explain::ExplanationFailure;
use crate::llm::LlmErrorKind;
use crate::problems::{ProblemBank, ProblemRecord, MAX_TASK};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

/// Tasks 1..=3 have problems, everything else is empty
fn test_context() -> DialogueContext {
    let bank = ProblemBank::from_tasks([
        (1, vec![ProblemRecord::new("v=?", "5")]),
        (
            2,
            vec![
                ProblemRecord::new("a=?", "Correct"),
                ProblemRecord::new("b=?", "12,5"),
                ProblemRecord::new("c=?", "Ток"),
            ],
        ),
        (
            3,
            vec![
                ProblemRecord::new("x=?", "1"),
                ProblemRecord::new("y=?", "2"),
            ],
        ),
    ])
    .unwrap();
    DialogueContext::new(Arc::new(bank))
}

fn reply_texts(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Reply(reply) => Some(reply.text.clone()),
            _ => None,
        })
        .collect()
}

/// Drive a session through a sequence of events, returning the final one
fn run(ctx: &DialogueContext, events: Vec<Event>) -> Session {
    events.into_iter().fold(Session::default(), |session, event| {
        transition(&session, ctx, event).new_session
    })
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_dialogue_state() -> impl Strategy<Value = DialogueState> {
    prop_oneof![
        Just(DialogueState::Idle),
        Just(DialogueState::ChoosingTask),
        Just(DialogueState::SolvingTask),
    ]
}

/// Sessions that satisfy the store invariants for `test_context()`
fn arb_valid_session() -> impl Strategy<Value = Session> {
    prop_oneof![
        Just(Session::default()),
        arb_dialogue_state().prop_map(|state| Session {
            state,
            current_task: None,
            problem_index: 0,
        }),
        (arb_dialogue_state(), 0usize..3).prop_map(|(state, index)| Session {
            state,
            current_task: Some(2),
            problem_index: index,
        }),
        (arb_dialogue_state(), 0usize..2).prop_map(|(state, index)| Session {
            state,
            current_task: Some(3),
            problem_index: index,
        }),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Solve),
        Just(Action::ChangeTask),
        Just(Action::Explain),
    ]
}

fn arb_failure() -> impl Strategy<Value = ExplanationFailure> {
    prop_oneof![
        Just(ExplanationFailure::Timeout(Duration::from_secs(15))),
        Just(ExplanationFailure::Unavailable {
            attempts: 5,
            last_kind: LlmErrorKind::RateLimit,
        }),
        Just(ExplanationFailure::Rejected {
            message: "denied".to_string(),
        }),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Result<String, ExplanationFailure>> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(Ok),
        arb_failure().prop_map(Err),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z ]{0,10}".prop_map(|full_name| Event::Start { full_name }),
        (0u32..30).prop_map(|n| Event::text(n.to_string())),
        prop_oneof![
            Just("Да, поехали)"),
            Just("Нет, не хочу("),
            Just("Я хочу подготовиться"),
            Just("correct"),
            Just(" 12,5 "),
            Just("ток"),
            Just("1"),
            Just("2"),
            Just("5"),
        ]
        .prop_map(Event::text),
        "[a-z0-9 ]{0,12}".prop_map(Event::text),
        arb_action().prop_map(Event::Action),
        "[a-z]{0,8}".prop_map(|data| Event::UnknownAction { data }),
        arb_outcome().prop_map(|outcome| Event::ExplanationReady {
            correct_answer: "5".to_string(),
            outcome,
        }),
    ]
}

// ============================================================================
// State Validity Checkers
// ============================================================================

fn is_valid_session(session: &Session, ctx: &DialogueContext) -> bool {
    match session.current_task {
        None => session.problem_index == 0,
        Some(task) => ctx
            .bank
            .problems(task)
            .is_some_and(|problems| session.problem_index < problems.len()),
    }
}

fn effects_are_valid(effects: &[Effect], new_session: &Session) -> bool {
    let clears = effects.iter().any(|e| matches!(e, Effect::ClearSession));
    let persists = effects.iter().any(|e| matches!(e, Effect::PersistSession));

    // Clearing always lands on the dormant session, and never together with persisting
    if clears && (!new_session.is_dormant() || persists) {
        return false;
    }

    // Explanations are only requested while solving
    let requests_explanation = effects
        .iter()
        .any(|e| matches!(e, Effect::RequestExplanation { .. }));
    if requests_explanation && new_session.state != DialogueState::SolvingTask {
        return false;
    }

    // Every transition says something to the user
    effects.iter().any(|e| matches!(e, Effect::Reply(_)))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Valid session after any transition
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..25)) {
        let ctx = test_context();
        let mut session = Session::default();

        for event in events {
            let result = transition(&session, &ctx, event);
            prop_assert!(is_valid_session(&result.new_session, &ctx), "Invalid session: {:?}", result.new_session);
            prop_assert!(
                effects_are_valid(&result.effects, &result.new_session),
                "Invalid effects for session {:?}: {:?}",
                result.new_session,
                result.effects
            );
            session = result.new_session;
        }
    }

    // Invariant 2: Task numbers outside 1..=MAX_TASK are rejected without a state change
    #[test]
    fn prop_out_of_range_task_rejected(
        task in prop_oneof![Just(0u64), (u64::from(MAX_TASK) + 1)..u64::MAX],
        session in arb_valid_session(),
    ) {
        let choosing = session.with_state(DialogueState::ChoosingTask);
        let result = transition(&choosing, &test_context(), Event::text(task.to_string()));
        prop_assert_eq!(&result.new_session, &choosing);
        prop_assert_eq!(reply_texts(&result.effects), vec![messages::task_out_of_range(MAX_TASK)]);
    }

    // Invariant 3: Selecting a task with problems and solving always starts at index 0
    #[test]
    fn prop_solve_after_selection_starts_at_first_problem(
        task in 1u32..=3,
        session in arb_valid_session(),
    ) {
        let ctx = test_context();
        let choosing = session.with_state(DialogueState::ChoosingTask);
        let selected = transition(&choosing, &ctx, Event::text(task.to_string())).new_session;
        let result = transition(&selected, &ctx, Event::Action(Action::Solve));

        let problems = ctx.bank.problems(task).unwrap();
        prop_assert_eq!(result.new_session.problem_index, 0);
        prop_assert_eq!(result.new_session.state, DialogueState::SolvingTask);
        prop_assert_eq!(
            reply_texts(&result.effects),
            vec![messages::problem(0, problems.len(), &problems[0].question)]
        );
    }

    // Invariant 4: Answers match regardless of case and surrounding whitespace
    #[test]
    fn prop_answer_matching_normalizes(
        left in "[ \t]{0,3}",
        right in "[ \t\n]{0,3}",
        upper in any::<bool>(),
    ) {
        let ctx = test_context();
        let session = Session {
            state: DialogueState::SolvingTask,
            current_task: Some(2),
            problem_index: 0,
        };
        let answer = if upper { "CORRECT" } else { "correct" };
        let result = transition(&session, &ctx, Event::text(format!("{left}{answer}{right}")));
        prop_assert_eq!(result.new_session.problem_index, 1);
    }

    // Invariant 5: A wrong answer never advances progress or changes state
    #[test]
    fn prop_wrong_answer_changes_nothing(
        answer in "[a-z0-9]{1,10}",
        index in 0usize..3,
    ) {
        let ctx = test_context();
        let session = Session {
            state: DialogueState::SolvingTask,
            current_task: Some(2),
            problem_index: index,
        };
        let expected = normalize(&ctx.current_problem(&session).unwrap().answer);
        prop_assume!(normalize(&answer) != expected);

        let result = transition(&session, &ctx, Event::text(answer));
        prop_assert_eq!(result.new_session, session);
        prop_assert_eq!(reply_texts(&result.effects), vec![messages::WRONG.to_string()]);
    }

    // Invariant 6: Answering every problem in order ends dormant and offers nothing more
    #[test]
    fn prop_exhausting_task_ends_dormant(task in 1u32..=3, extra in proptest::collection::vec(arb_action(), 0..3)) {
        let ctx = test_context();
        let problems = ctx.bank.problems(task).unwrap();

        let mut events = vec![
            Event::text("Да, поехали)"),
            Event::text(task.to_string()),
            Event::Action(Action::Solve),
        ];
        events.extend(problems.iter().map(|p| Event::text(p.answer.clone())));
        let session = run(&ctx, events);
        prop_assert!(session.is_dormant());

        // Without re-selection no problem of this task is offered again
        let mut current = session;
        for action in extra {
            let result = transition(&current, &ctx, Event::Action(action));
            for text in reply_texts(&result.effects) {
                prop_assert!(!text.starts_with("Задача"), "Re-offered problem: {}", text);
            }
            current = result.new_session;
        }
    }

    // Invariant 7: Explanation results never change the session
    #[test]
    fn prop_explanation_result_keeps_session(
        session in arb_valid_session(),
        outcome in arb_outcome(),
    ) {
        let result = transition(
            &session,
            &test_context(),
            Event::ExplanationReady { correct_answer: "5".to_string(), outcome },
        );
        prop_assert_eq!(result.new_session, session);
    }
}
