//! Random question generation.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::note::{note_at, Fret, GuitarString, Note, Position, StringLetter};
use crate::question::{Question, QuestionKind};

/// Highest fret a find-note target may sit on. The 12th fret is left out
/// because it repeats the open string.
pub const FIND_NOTE_MAX_FRET: u8 = Fret::MAX - 1;

/// Pick one of `kinds` uniformly and build a question of that kind.
///
/// Returns `None` when `kinds` is empty.
pub fn generate<R: Rng + ?Sized>(kinds: &[QuestionKind], rng: &mut R) -> Option<Question> {
    let kind = *kinds.choose(rng)?;
    Some(generate_kind(kind, rng))
}

/// Build a question of a specific kind.
pub fn generate_kind<R: Rng + ?Sized>(kind: QuestionKind, rng: &mut R) -> Question {
    match kind {
        QuestionKind::NoteId => {
            let position = random_position(rng, 0, Fret::MAX);
            Question::NoteId {
                position,
                answer: position.note(),
            }
        }
        QuestionKind::FindNote => {
            let position = random_position(rng, 0, FIND_NOTE_MAX_FRET);
            Question::FindNote {
                position,
                answer: position.note(),
            }
        }
        QuestionKind::NameString => {
            let reference = random_position(rng, 1, Fret::MAX);
            let note = reference.note();
            Question::NameString {
                fret: reference.fret,
                note,
                answers: letters_with_note(reference.fret, note),
                wrong_selections: BTreeSet::new(),
            }
        }
    }
}

/// Letters of every string that sounds `note` at `fret`.
pub fn letters_with_note(fret: Fret, note: Note) -> BTreeSet<StringLetter> {
    GuitarString::ALL
        .iter()
        .filter(|s| note_at(**s, fret) == note)
        .map(|s| s.letter())
        .collect()
}

fn random_position<R: Rng + ?Sized>(rng: &mut R, min_fret: u8, max_fret: u8) -> Position {
    let index = rng.gen_range(0..GuitarString::COUNT);
    let fret = rng.gen_range(min_fret..=max_fret);
    Position::new(GuitarString::ALL[index], Fret::saturating(fret))
}
