//! Per-NPC conversation state machine.
//!
//! `Closed -> Open -> Open(pending choice) -> Closed`. Every opening bumps the
//! visit count and picks a fresh line set; choices may redirect the active
//! sequence wholesale.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

use super::selection::select_line_set;

#[derive(Component, Debug, Clone, Default)]
pub struct Conversation {
    visit_count: u32,
    active: Vec<DialogueEntry>,
    cursor: usize,
    open: bool,
}

impl Conversation {
    /// Resume a session for an NPC that has already been talked to.
    pub fn with_visits(visit_count: u32) -> Self {
        Self {
            visit_count,
            ..Default::default()
        }
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn active_sequence(&self) -> &[DialogueEntry] {
        &self.active
    }

    /// Start a new visit. Does nothing (and returns false) while already open.
    pub fn open(&mut self, def: &DialogueDef, rng: &mut impl Rng) -> bool {
        if self.open {
            return false;
        }
        self.visit_count += 1;
        let sets = def.line_sets();
        let idx = select_line_set(self.visit_count, sets.len(), rng);
        self.active = sets.get(idx).cloned().unwrap_or_default();
        self.cursor = 0;
        self.open = true;
        true
    }

    /// Step past a plain entry. A pending choice blocks advancing.
    pub fn advance(&mut self) {
        if !self.open || !self.pending_choices().is_empty() {
            return;
        }
        self.cursor += 1;
        if self.cursor >= self.active.len() {
            self.finish();
        }
    }

    /// Pick choice `index` of the current entry. Returns false when there is
    /// no such choice, leaving the session untouched.
    pub fn choose(&mut self, index: usize) -> bool {
        if !self.open {
            return false;
        }
        let Some(choice) = self.pending_choices().get(index) else {
            return false;
        };
        match choice.next.clone() {
            ChoiceNext::Lines(lines) if !lines.is_empty() => {
                self.active = lines;
                self.cursor = 0;
            }
            ChoiceNext::Line(line) => {
                self.active = vec![DialogueEntry::Plain(line)];
                self.cursor = 0;
            }
            ChoiceNext::Lines(_) | ChoiceNext::End => self.finish(),
        }
        true
    }

    /// The entry under the cursor, or `"..."` when there is none.
    pub fn current_entry(&self) -> EntryView<'_> {
        if self.active.is_empty() {
            return EntryView::Text(FALLBACK_LINE);
        }
        let idx = self.cursor.min(self.active.len() - 1);
        self.active[idx].view()
    }

    pub fn pending_choices(&self) -> &[Choice] {
        if !self.open {
            return &[];
        }
        self.current_entry().choices()
    }

    /// Force the session closed. The visit count is kept.
    pub fn close(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.open = false;
        self.active.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wonhee() -> DialogueDef {
        DialogueDef::new(vec![
            vec![
                DialogueEntry::plain("안녕"),
                DialogueEntry::branching(
                    "주 100시간제가 도입된대…",
                    vec![
                        Choice::new(
                            "헉… 괜찮아?",
                            ChoiceNext::Lines(vec![DialogueEntry::plain("괜찮진 않은데 버텨야지…")]),
                        ),
                        Choice::new("그만둬!", ChoiceNext::Line("그건… 현실적으로 쉽지 않다…".into())),
                        Choice::new("...", ChoiceNext::End),
                    ],
                ),
            ],
            vec![DialogueEntry::plain("왜 뭐 할말 있어??")],
            vec![DialogueEntry::plain("음 이제 말 그만 걸어줄레??")],
            vec![DialogueEntry::plain("나 이제 일 가야해")],
        ])
    }

    fn run_to_close(conv: &mut Conversation) {
        while conv.is_open() {
            if conv.pending_choices().is_empty() {
                conv.advance();
            } else {
                conv.choose(0);
            }
        }
    }

    #[test]
    fn test_first_open_plays_first_set() {
        let def = wonhee();
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::default();
        assert!(conv.open(&def, &mut rng));
        assert_eq!(conv.visit_count(), 1);
        assert_eq!(conv.active_sequence(), def.line_sets()[0].as_slice());
        assert_eq!(conv.cursor(), 0);
        assert_eq!(conv.current_entry(), EntryView::Text("안녕"));
    }

    #[test]
    fn test_open_while_open_is_refused() {
        let def = wonhee();
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::default();
        conv.open(&def, &mut rng);
        assert!(!conv.open(&def, &mut rng));
        assert_eq!(conv.visit_count(), 1);
    }

    #[test]
    fn test_sixth_visit_loops_tail_sets() {
        let def = wonhee();
        let mut rng = StdRng::seed_from_u64(99);
        let mut conv = Conversation::default();
        for _ in 0..5 {
            conv.open(&def, &mut rng);
            run_to_close(&mut conv);
        }
        conv.open(&def, &mut rng);
        assert_eq!(conv.visit_count(), 6);
        let seq = conv.active_sequence();
        assert!(seq == def.line_sets()[2].as_slice() || seq == def.line_sets()[3].as_slice());
    }

    #[test]
    fn test_advance_is_blocked_by_pending_choice() {
        let def = wonhee();
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::default();
        conv.open(&def, &mut rng);
        conv.advance();
        assert_eq!(conv.cursor(), 1);
        assert_eq!(conv.pending_choices().len(), 3);
        for _ in 0..5 {
            conv.advance();
        }
        assert_eq!(conv.cursor(), 1);
        assert!(conv.is_open());
    }

    #[test]
    fn test_choose_lines_redirects_sequence() {
        let def = DialogueDef::new(vec![vec![DialogueEntry::branching(
            "Q",
            vec![Choice::new(
                "A",
                ChoiceNext::Lines(vec![DialogueEntry::plain("x"), DialogueEntry::plain("y")]),
            )],
        )]]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::default();
        conv.open(&def, &mut rng);
        assert!(conv.choose(0));
        assert!(conv.is_open());
        assert_eq!(conv.cursor(), 0);
        assert_eq!(
            conv.active_sequence(),
            &[DialogueEntry::plain("x"), DialogueEntry::plain("y")]
        );
        conv.advance();
        conv.advance();
        assert!(!conv.is_open());
    }

    #[test]
    fn test_choose_line_plays_single_reply() {
        let def = wonhee();
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::default();
        conv.open(&def, &mut rng);
        conv.advance();
        conv.choose(1);
        assert_eq!(conv.current_entry().text(), "그건… 현실적으로 쉽지 않다…");
        conv.advance();
        assert!(!conv.is_open());
    }

    #[test]
    fn test_choose_end_closes() {
        let def = DialogueDef::new(vec![vec![DialogueEntry::branching(
            "Q",
            vec![Choice::new("A", ChoiceNext::End)],
        )]]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::default();
        conv.open(&def, &mut rng);
        assert!(conv.choose(0));
        assert!(!conv.is_open());
        assert_eq!(conv.visit_count(), 1);
    }

    #[test]
    fn test_invalid_choice_changes_nothing() {
        let def = wonhee();
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::default();
        conv.open(&def, &mut rng);
        conv.advance();
        let before = conv.clone();
        assert!(!conv.choose(3));
        assert!(!conv.choose(usize::MAX));
        assert_eq!(conv.cursor(), before.cursor());
        assert_eq!(conv.active_sequence(), before.active_sequence());
        assert!(conv.is_open());
    }

    #[test]
    fn test_choose_on_plain_entry_is_noop() {
        let def = wonhee();
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::default();
        conv.open(&def, &mut rng);
        assert!(!conv.choose(0));
        assert_eq!(conv.cursor(), 0);
    }

    #[test]
    fn test_closed_session_reads_fallback() {
        let conv = Conversation::default();
        assert_eq!(conv.current_entry(), EntryView::Text(FALLBACK_LINE));
        assert!(conv.pending_choices().is_empty());
    }

    #[test]
    fn test_close_keeps_visit_count() {
        let def = wonhee();
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::with_visits(3);
        conv.open(&def, &mut rng);
        conv.close();
        assert!(!conv.is_open());
        assert_eq!(conv.visit_count(), 4);
    }

    #[test]
    fn test_fallback_def_closes_after_one_line() {
        let def = DialogueDef::fallback();
        let mut rng = StdRng::seed_from_u64(1);
        let mut conv = Conversation::default();
        conv.open(&def, &mut rng);
        assert_eq!(conv.current_entry().text(), FALLBACK_LINE);
        conv.advance();
        assert!(!conv.is_open());
    }
}
