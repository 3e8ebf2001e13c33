//! Answer checking and score bookkeeping.
//!
//! The grader holds no state between calls. The engine lends it the
//! current question and score for the duration of a single submission.

use crate::error::InputError;
use crate::note::{normalize_note, normalize_string_letter, Position};
use crate::question::Question;
use crate::session::{Score, WrongAnswerPolicy};
use crate::traits::{BoardHit, ControlId, FeedbackKind, HitKind, StringChoiceFeedback};

/// Raw input forwarded by the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer<'a> {
    /// Typed text or a button label.
    Text(&'a str),
    /// A fretboard cell.
    Click(Position),
}

/// Whether an attempt was right and what the engine should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    /// Wrong, and the same question stays open.
    IncorrectRetry,
    /// Wrong, and the answer is revealed before moving on.
    IncorrectReveal,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }

    /// Whether the question is finished after this attempt.
    pub fn resolves_question(self) -> bool {
        !matches!(self, Verdict::IncorrectRetry)
    }

    pub fn feedback(self, question: &Question) -> (String, FeedbackKind) {
        match self {
            Verdict::Correct => ("Correct.".to_string(), FeedbackKind::Good),
            Verdict::IncorrectRetry => ("Incorrect. Try again.".to_string(), FeedbackKind::Bad),
            Verdict::IncorrectReveal => (
                format!("Incorrect. {}", question.correct_answer_text()),
                FeedbackKind::Bad,
            ),
        }
    }
}

/// Check `answer` against `question`.
///
/// Returns `Ok(None)` when this kind of input does not apply to the
/// question (typed text for a find-note question, a click for anything
/// else). A wrong string letter is recorded on the question.
pub fn check(question: &mut Question, answer: Answer<'_>) -> Result<Option<bool>, InputError> {
    match (question, answer) {
        (Question::NoteId { answer: expected, .. }, Answer::Text(raw)) => {
            let note =
                normalize_note(raw).ok_or_else(|| InputError::MalformedNote(raw.to_string()))?;
            Ok(Some(note == *expected))
        }
        (
            Question::NameString {
                answers,
                wrong_selections,
                ..
            },
            Answer::Text(raw),
        ) => {
            let letter = normalize_string_letter(raw)
                .ok_or_else(|| InputError::UnknownStringLetter(raw.to_string()))?;
            let correct = answers.contains(&letter);
            if !correct {
                wrong_selections.insert(letter);
            }
            Ok(Some(correct))
        }
        (Question::FindNote { position, .. }, Answer::Click(clicked)) => {
            Ok(Some(*position == clicked))
        }
        (Question::FindNote { .. }, Answer::Text(_))
        | (Question::NoteId { .. } | Question::NameString { .. }, Answer::Click(_)) => Ok(None),
    }
}

/// Count one graded attempt and decide what follows it.
pub fn record_attempt(score: &mut Score, correct: bool, policy: WrongAnswerPolicy) -> Verdict {
    score.total += 1;
    if correct {
        score.correct += 1;
        return Verdict::Correct;
    }
    match policy {
        WrongAnswerPolicy::RetryUntilCorrect => Verdict::IncorrectRetry,
        WrongAnswerPolicy::RevealNext => Verdict::IncorrectReveal,
    }
}

/// Board cells to highlight after a graded attempt.
pub fn board_hits(question: &Question, answer: Answer<'_>, verdict: Verdict) -> Vec<BoardHit> {
    let reveal = verdict != Verdict::IncorrectRetry;
    match (question, answer) {
        (Question::NoteId { position, .. }, Answer::Text(_)) => {
            let kind = if reveal {
                HitKind::Correct
            } else {
                HitKind::Wrong
            };
            vec![BoardHit {
                position: *position,
                kind,
            }]
        }
        (Question::FindNote { position, .. }, Answer::Click(clicked)) => {
            if verdict.is_correct() {
                return vec![BoardHit {
                    position: clicked,
                    kind: HitKind::Correct,
                }];
            }
            let mut hits = vec![BoardHit {
                position: clicked,
                kind: HitKind::Wrong,
            }];
            if reveal {
                hits.push(BoardHit {
                    position: *position,
                    kind: HitKind::Correct,
                });
            }
            hits
        }
        _ => Vec::new(),
    }
}

/// Letter-button highlighting after a graded string pick.
pub fn string_choices(
    question: &Question,
    raw: &str,
    verdict: Verdict,
    source: Option<ControlId>,
) -> Option<StringChoiceFeedback> {
    let Question::NameString {
        answers,
        wrong_selections,
        ..
    } = question
    else {
        return None;
    };
    let picked = normalize_string_letter(raw)?;
    let revealed = (verdict != Verdict::IncorrectRetry).then(|| answers.clone());
    Some(StringChoiceFeedback {
        wrong: wrong_selections.clone(),
        revealed,
        picked,
        picked_correct: verdict.is_correct(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::note::{Fret, GuitarString, Note, StringLetter};

    fn position(index: usize, fret: u8) -> Position {
        Position::new(
            GuitarString::from_index(index).unwrap(),
            Fret::new(fret).unwrap(),
        )
    }

    fn note_id_low_e_third() -> Question {
        Question::NoteId {
            position: position(0, 3),
            answer: Note::G,
        }
    }

    fn name_string_a_fifth() -> Question {
        Question::NameString {
            fret: Fret::new(5).unwrap(),
            note: Note::A,
            answers: [StringLetter::E].into_iter().collect(),
            wrong_selections: BTreeSet::new(),
        }
    }

    #[test]
    fn note_id_accepts_lowercase_and_rejects_enharmonic_neighbour() {
        let mut q = note_id_low_e_third();
        assert_eq!(check(&mut q, Answer::Text("g")), Ok(Some(true)));
        assert_eq!(check(&mut q, Answer::Text("gb")), Ok(Some(false)));
        assert_eq!(
            check(&mut q, Answer::Text("zz")),
            Err(InputError::MalformedNote("zz".into()))
        );
    }

    #[test]
    fn find_note_ignores_text_and_checks_clicks() {
        let mut q = Question::FindNote {
            position: position(1, 2),
            answer: Note::B,
        };
        assert_eq!(check(&mut q, Answer::Text("B")), Ok(None));
        assert_eq!(check(&mut q, Answer::Click(position(1, 2))), Ok(Some(true)));
        // Same note on another string is still wrong.
        assert_eq!(check(&mut q, Answer::Click(position(0, 7))), Ok(Some(false)));
    }

    #[test]
    fn clicks_do_not_apply_to_other_kinds() {
        let mut q = note_id_low_e_third();
        assert_eq!(check(&mut q, Answer::Click(position(0, 3))), Ok(None));
        let mut q = name_string_a_fifth();
        assert_eq!(check(&mut q, Answer::Click(position(0, 5))), Ok(None));
    }

    #[test]
    fn name_string_records_wrong_letters() {
        let mut q = name_string_a_fifth();
        assert_eq!(check(&mut q, Answer::Text("d")), Ok(Some(false)));
        assert_eq!(check(&mut q, Answer::Text("d")), Ok(Some(false)));
        assert_eq!(
            check(&mut q, Answer::Text("x")),
            Err(InputError::UnknownStringLetter("x".into()))
        );
        assert_eq!(check(&mut q, Answer::Text(" e ")), Ok(Some(true)));
        match q {
            Question::NameString {
                wrong_selections, ..
            } => assert_eq!(
                wrong_selections,
                [StringLetter::D].into_iter().collect::<BTreeSet<_>>()
            ),
            _ => unreachable!(),
        }
    }

    #[test]
    fn record_attempt_counts_every_attempt() {
        let mut score = Score::default();
        let policy = WrongAnswerPolicy::RetryUntilCorrect;
        assert_eq!(record_attempt(&mut score, false, policy), Verdict::IncorrectRetry);
        assert_eq!(record_attempt(&mut score, false, policy), Verdict::IncorrectRetry);
        assert_eq!(record_attempt(&mut score, true, policy), Verdict::Correct);
        assert_eq!(score, Score { correct: 1, total: 3 });

        let mut score = Score::default();
        assert_eq!(
            record_attempt(&mut score, false, WrongAnswerPolicy::RevealNext),
            Verdict::IncorrectReveal
        );
        assert_eq!(score, Score { correct: 0, total: 1 });
    }

    #[test]
    fn feedback_messages() {
        let q = note_id_low_e_third();
        assert_eq!(
            Verdict::IncorrectReveal.feedback(&q),
            ("Incorrect. The note is G.".to_string(), FeedbackKind::Bad)
        );
        assert_eq!(Verdict::Correct.feedback(&q).0, "Correct.");
        assert_eq!(Verdict::IncorrectRetry.feedback(&q).0, "Incorrect. Try again.");
        assert!(!Verdict::IncorrectRetry.resolves_question());
        assert!(Verdict::IncorrectReveal.resolves_question());
    }

    #[test]
    fn wrong_click_reveals_target_only_when_moving_on() {
        let q = Question::FindNote {
            position: position(1, 2),
            answer: Note::B,
        };
        let clicked = position(2, 9);
        let hits = board_hits(&q, Answer::Click(clicked), Verdict::IncorrectReveal);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].position, position(1, 2));
        assert_eq!(hits[1].kind, HitKind::Correct);

        let hits = board_hits(&q, Answer::Click(clicked), Verdict::IncorrectRetry);
        assert_eq!(
            hits,
            vec![BoardHit {
                position: clicked,
                kind: HitKind::Wrong
            }]
        );
    }

    #[test]
    fn string_choices_hide_answers_while_retrying() {
        let mut q = name_string_a_fifth();
        check(&mut q, Answer::Text("G")).unwrap();
        let fb = string_choices(&q, "G", Verdict::IncorrectRetry, Some(ControlId(4))).unwrap();
        assert!(fb.revealed.is_none());
        assert!(!fb.picked_correct);
        assert_eq!(fb.source, Some(ControlId(4)));
        assert!(fb.wrong.contains(&StringLetter::G));

        let fb = string_choices(&q, "E", Verdict::Correct, None).unwrap();
        assert_eq!(
            fb.revealed,
            Some([StringLetter::E].into_iter().collect::<BTreeSet<_>>())
        );
    }
}
