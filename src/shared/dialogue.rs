//! Dialogue data model: entries, choices, per-NPC definitions and the registry.
//!
//! Authored data is JSON-shaped. An entry is either a bare string or a node
//! `{"text": "...", "choices": [{"label": "...", "next": [...] | "..."}]}`.
//! Parsing never fails on shape: anything unexpected degrades to `"..."`.

use bevy::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::NpcId;

/// Shown whenever there is nothing sensible to say.
pub const FALLBACK_LINE: &str = "...";

// ═══════════════════════════════════════════════════════════════════════
// ENTRIES
// ═══════════════════════════════════════════════════════════════════════

/// One displayable unit of NPC speech.
///
/// `Branching` always carries at least one choice; a node without usable
/// choices is read as `Plain`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum DialogueEntry {
    Plain(String),
    Branching { text: String, choices: Vec<Choice> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub next: ChoiceNext,
}

/// Where a choice leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceNext {
    /// Replace the active sequence with these lines.
    Lines(Vec<DialogueEntry>),
    /// One-line reply.
    Line(String),
    /// Close the conversation.
    End,
}

/// One ordered batch of entries tied to a visit count.
pub type LineSet = Vec<DialogueEntry>;

impl DialogueEntry {
    pub fn plain(text: impl Into<String>) -> Self {
        DialogueEntry::Plain(text.into())
    }

    /// Build a branching entry. With no choices this yields a plain entry.
    pub fn branching(text: impl Into<String>, choices: Vec<Choice>) -> Self {
        let text = text.into();
        if choices.is_empty() {
            DialogueEntry::Plain(text)
        } else {
            DialogueEntry::Branching { text, choices }
        }
    }

    pub fn fallback() -> Self {
        DialogueEntry::Plain(FALLBACK_LINE.to_string())
    }

    pub fn text(&self) -> &str {
        match self {
            DialogueEntry::Plain(text) => text,
            DialogueEntry::Branching { text, .. } => text,
        }
    }

    pub fn choices(&self) -> &[Choice] {
        match self {
            DialogueEntry::Plain(_) => &[],
            DialogueEntry::Branching { choices, .. } => choices,
        }
    }

    pub fn has_choices(&self) -> bool {
        !self.choices().is_empty()
    }

    pub fn view(&self) -> EntryView<'_> {
        match self {
            DialogueEntry::Plain(text) => EntryView::Text(text),
            DialogueEntry::Branching { text, choices } => EntryView::Prompt { text, choices },
        }
    }
}

impl From<&str> for DialogueEntry {
    fn from(text: &str) -> Self {
        DialogueEntry::Plain(text.to_string())
    }
}

impl From<Value> for DialogueEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => DialogueEntry::Plain(text),
            Value::Object(mut node) => {
                let text = match node.remove("text") {
                    Some(Value::String(text)) => text,
                    _ => FALLBACK_LINE.to_string(),
                };
                let choices = match node.remove("choices") {
                    Some(Value::Array(items)) => items
                        .into_iter()
                        .enumerate()
                        .filter_map(|(i, item)| Choice::from_value(i, item))
                        .collect(),
                    _ => Vec::new(),
                };
                DialogueEntry::branching(text, choices)
            }
            _ => DialogueEntry::fallback(),
        }
    }
}

impl Choice {
    pub fn new(label: impl Into<String>, next: ChoiceNext) -> Self {
        Self {
            label: label.into(),
            next,
        }
    }

    /// Lenient read of one authored choice. Non-object values are dropped.
    fn from_value(index: usize, value: Value) -> Option<Self> {
        let Value::Object(mut obj) = value else {
            return None;
        };
        let label = match obj.remove("label") {
            Some(Value::String(label)) => label,
            _ => format!("선택 {}", index + 1),
        };
        let next = match obj.remove("next") {
            Some(Value::Array(items)) if !items.is_empty() => {
                ChoiceNext::Lines(items.into_iter().map(DialogueEntry::from).collect())
            }
            Some(Value::String(line)) if !line.is_empty() => ChoiceNext::Line(line),
            _ => ChoiceNext::End,
        };
        Some(Self { label, next })
    }
}

/// Read-only view handed to the dialogue panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryView<'a> {
    Text(&'a str),
    Prompt { text: &'a str, choices: &'a [Choice] },
}

impl<'a> EntryView<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            EntryView::Text(text) => text,
            EntryView::Prompt { text, .. } => text,
        }
    }

    pub fn choices(&self) -> &'a [Choice] {
        match self {
            EntryView::Text(_) => &[],
            EntryView::Prompt { choices, .. } => choices,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════

/// Static dialog data for one NPC: line sets indexed by visit.
/// Never empty, and no set is empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct DialogueDef {
    lines_by_visit: Vec<LineSet>,
}

/// Lenient read of `{"lines_by_visit": [[...], ...]}`. Anything else is
/// the fallback definition.
impl From<Value> for DialogueDef {
    fn from(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return DialogueDef::fallback();
        };
        let Some(Value::Array(sets)) = obj.remove("lines_by_visit") else {
            return DialogueDef::fallback();
        };
        let sets = sets
            .into_iter()
            .map(|set| match set {
                Value::Array(items) => items.into_iter().map(DialogueEntry::from).collect(),
                other => vec![DialogueEntry::from(other)],
            })
            .collect();
        DialogueDef::new(sets)
    }
}

impl DialogueDef {
    pub fn new(sets: Vec<LineSet>) -> Self {
        let mut lines_by_visit: Vec<LineSet> = sets
            .into_iter()
            .map(|set| {
                if set.is_empty() {
                    vec![DialogueEntry::fallback()]
                } else {
                    set
                }
            })
            .collect();
        if lines_by_visit.is_empty() {
            lines_by_visit.push(vec![DialogueEntry::fallback()]);
        }
        Self { lines_by_visit }
    }

    /// `[["..."]]`
    pub fn fallback() -> Self {
        Self::new(Vec::new())
    }

    pub fn line_sets(&self) -> &[LineSet] {
        &self.lines_by_visit
    }

    pub fn set_count(&self) -> usize {
        self.lines_by_visit.len()
    }
}

impl Default for DialogueDef {
    fn default() -> Self {
        Self::fallback()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// REGISTRY: loaded from data
// ═══════════════════════════════════════════════════════════════════════

/// The dialogue database, keyed by NPC id. Built once at startup and
/// read by the NPC domain.
#[derive(Resource, Debug, Clone, Default)]
pub struct DialogueRegistry {
    defs: HashMap<NpcId, DialogueDef>,
    fallback: DialogueDef,
}

impl DialogueRegistry {
    pub fn insert(&mut self, npc_id: impl Into<NpcId>, def: DialogueDef) {
        self.defs.insert(npc_id.into(), def);
    }

    /// Definition for `npc_id`, or `[["..."]]` when none is authored.
    pub fn lookup(&self, npc_id: &str) -> &DialogueDef {
        self.defs.get(npc_id).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, npc_id: &str) -> bool {
        self.defs.contains_key(npc_id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Overlay definitions from a JSON document shaped like
    /// `{"npc_id": {"lines_by_visit": [[...], ...]}}`. Later entries win.
    /// Only a document that is not an object is an error; a malformed NPC
    /// entry reads as `[["..."]]`.
    pub fn merge_json(&mut self, json: &str) -> Result<usize, serde_json::Error> {
        let parsed: HashMap<NpcId, Value> = serde_json::from_str(json)?;
        let count = parsed.len();
        self.defs.extend(
            parsed
                .into_iter()
                .map(|(npc_id, value)| (npc_id, DialogueDef::from(value))),
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_reads_as_plain() {
        let entry: DialogueEntry = serde_json::from_value(json!("안녕")).unwrap();
        assert_eq!(entry, DialogueEntry::plain("안녕"));
    }

    #[test]
    fn test_node_with_choices_reads_as_branching() {
        let entry: DialogueEntry = serde_json::from_value(json!({
            "text": "주 100시간제가 도입된대…",
            "choices": [
                {"label": "헉… 괜찮아?", "next": ["괜찮진 않은데 버텨야지…"]},
                {"label": "그만둬!", "next": "그건… 현실적으로 쉽지 않다…"},
                {"label": "안녕"}
            ]
        }))
        .unwrap();

        let choices = entry.choices();
        assert_eq!(choices.len(), 3);
        assert_eq!(
            choices[0].next,
            ChoiceNext::Lines(vec![DialogueEntry::plain("괜찮진 않은데 버텨야지…")])
        );
        assert_eq!(
            choices[1].next,
            ChoiceNext::Line("그건… 현실적으로 쉽지 않다…".to_string())
        );
        assert_eq!(choices[2].next, ChoiceNext::End);
    }

    #[test]
    fn test_empty_next_ends_conversation() {
        let entry: DialogueEntry = serde_json::from_value(json!({
            "text": "?",
            "choices": [{"label": "a", "next": []}, {"label": "b", "next": ""}]
        }))
        .unwrap();
        assert!(entry.choices().iter().all(|c| c.next == ChoiceNext::End));
    }

    #[test]
    fn test_malformed_values_degrade_to_fallback() {
        let number: DialogueEntry = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(number.text(), FALLBACK_LINE);

        let no_text: DialogueEntry = serde_json::from_value(json!({"choices": "nope"})).unwrap();
        assert_eq!(no_text, DialogueEntry::plain(FALLBACK_LINE));

        let bad_choices: DialogueEntry =
            serde_json::from_value(json!({"text": "hi", "choices": [1, null]})).unwrap();
        assert_eq!(bad_choices, DialogueEntry::plain("hi"));
    }

    #[test]
    fn test_missing_label_gets_numbered_default() {
        let entry: DialogueEntry =
            serde_json::from_value(json!({"text": "?", "choices": [{}, {"next": "x"}]})).unwrap();
        assert_eq!(entry.choices()[0].label, "선택 1");
        assert_eq!(entry.choices()[1].label, "선택 2");
    }

    #[test]
    fn test_def_normalises_empty_sets() {
        let def = DialogueDef::new(vec![vec![], vec![DialogueEntry::plain("a")]]);
        assert_eq!(def.set_count(), 2);
        assert_eq!(def.line_sets()[0], vec![DialogueEntry::fallback()]);

        let empty = DialogueDef::new(Vec::new());
        assert_eq!(empty.line_sets(), &[vec![DialogueEntry::fallback()]]);
    }

    #[test]
    fn test_registry_lookup_falls_back() {
        let registry = DialogueRegistry::default();
        let def = registry.lookup("nobody");
        assert_eq!(def.set_count(), 1);
        assert_eq!(def.line_sets()[0][0].text(), FALLBACK_LINE);
    }

    #[test]
    fn test_registry_merge_json() {
        let mut registry = DialogueRegistry::default();
        registry.insert("워니", DialogueDef::fallback());
        let merged = registry
            .merge_json(r#"{"워니": {"lines_by_visit": [["a", "b"], "c"]}, "new": {}}"#)
            .unwrap();
        assert_eq!(merged, 2);
        let def = registry.lookup("워니");
        assert_eq!(def.set_count(), 2);
        assert_eq!(def.line_sets()[1], vec![DialogueEntry::plain("c")]);
        assert_eq!(registry.lookup("new").set_count(), 1);
    }

    #[test]
    fn test_registry_merge_keeps_good_entries_beside_bad_ones() {
        let mut registry = DialogueRegistry::default();
        let merged = registry
            .merge_json(
                r#"{"워니": "oops", "x": {"lines_by_visit": 5}, "상미니": {"lines_by_visit": [["hi"]]}}"#,
            )
            .unwrap();
        assert_eq!(merged, 3);
        assert_eq!(registry.lookup("워니"), &DialogueDef::fallback());
        assert_eq!(registry.lookup("x"), &DialogueDef::fallback());
        assert!(registry.contains("워니"));
        assert_eq!(
            registry.lookup("상미니").line_sets(),
            &[vec![DialogueEntry::plain("hi")]]
        );
    }

    #[test]
    fn test_def_from_json_value() {
        let def: DialogueDef =
            serde_json::from_value(json!({"lines_by_visit": [["a"], [], "b"]})).unwrap();
        assert_eq!(def.set_count(), 3);
        assert_eq!(def.line_sets()[1], vec![DialogueEntry::fallback()]);
        assert_eq!(def.line_sets()[2], vec![DialogueEntry::plain("b")]);
    }

    #[test]
    fn test_registry_merge_rejects_non_object() {
        let mut registry = DialogueRegistry::default();
        assert!(registry.merge_json("[1, 2]").is_err());
        assert!(registry.is_empty());
    }
}
