use bevy::prelude::*;
use crate::npcs::Conversation;
use crate::shared::*;
use super::UiFontHandle;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct DialogueBoxRoot;

#[derive(Component)]
pub struct DialogueNpcName;

#[derive(Component)]
pub struct DialogueText;

#[derive(Component)]
pub struct DialogueChoices;

#[derive(Component)]
pub struct DialoguePrompt;

// ═══════════════════════════════════════════════════════════════════════
// PANEL CONTENT
// ═══════════════════════════════════════════════════════════════════════

/// Everything the panel shows for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelContent {
    pub header: String,
    pub body: String,
    pub choices: String,
    pub prompt: &'static str,
}

pub fn panel_content(name: &str, visit: u32, entry: EntryView<'_>) -> PanelContent {
    let choices = entry
        .choices()
        .iter()
        .enumerate()
        .map(|(i, choice)| format!("{}. {}", i + 1, choice.label))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = if choices.is_empty() {
        "[Space] 다음 · [Esc] 닫기"
    } else {
        "[1-9] 선택 · [Esc] 닫기"
    };
    PanelContent {
        header: format!("{name}  ·  {visit}번째 만남"),
        body: entry.text().to_string(),
        choices,
        prompt,
    }
}

fn active_content(
    active: &ActiveConversation,
    npcs: &Query<(&Npc, &Conversation)>,
) -> Option<PanelContent> {
    let entity = active.npc?;
    let (npc, conversation) = npcs.get(entity).ok()?;
    conversation
        .is_open()
        .then(|| panel_content(&npc.name, conversation.visit_count(), conversation.current_entry()))
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_dialogue_box(
    mut commands: Commands,
    font_handle: Res<UiFontHandle>,
    active: Res<ActiveConversation>,
    npcs: Query<(&Npc, &Conversation)>,
) {
    let content = active_content(&active, &npcs).unwrap_or_else(|| {
        panel_content("???", 0, EntryView::Text(FALLBACK_LINE))
    });
    let font = font_handle.0.clone();

    commands
        .spawn((
            DialogueBoxRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::FlexEnd,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                padding: UiRect::bottom(Val::Px(20.0)),
                ..default()
            },
        ))
        .with_children(|parent| {
            // Bottom text panel
            parent
                .spawn((
                    Node {
                        width: Val::Px(760.0),
                        min_height: Val::Px(150.0),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(16.0)),
                        row_gap: Val::Px(8.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgba_u8(20, 22, 30, 225)),
                    BorderRadius::all(Val::Px(12.0)),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        DialogueNpcName,
                        Text::new(content.header),
                        TextFont {
                            font: font.clone(),
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.9, 0.6)),
                    ));

                    panel.spawn((
                        DialogueText,
                        Text::new(content.body),
                        TextFont {
                            font: font.clone(),
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));

                    panel.spawn((
                        DialogueChoices,
                        Text::new(content.choices),
                        TextFont {
                            font: font.clone(),
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.7, 0.85, 1.0)),
                    ));

                    panel.spawn((
                        DialoguePrompt,
                        Text::new(content.prompt),
                        TextFont {
                            font: font.clone(),
                            font_size: 12.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.6, 0.6, 0.6)),
                    ));
                });
        });
}

pub fn despawn_dialogue_box(
    mut commands: Commands,
    query: Query<Entity, With<DialogueBoxRoot>>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// REFRESH: mirror the conversation cursor into the panel
// ═══════════════════════════════════════════════════════════════════════

#[allow(clippy::type_complexity)]
pub fn refresh_dialogue_box(
    active: Res<ActiveConversation>,
    npcs: Query<(&Npc, &Conversation)>,
    mut texts: ParamSet<(
        Query<&mut Text, With<DialogueNpcName>>,
        Query<&mut Text, With<DialogueText>>,
        Query<&mut Text, With<DialogueChoices>>,
        Query<&mut Text, With<DialoguePrompt>>,
    )>,
) {
    let Some(content) = active_content(&active, &npcs) else {
        return;
    };

    for mut text in &mut texts.p0() {
        if text.0 != content.header {
            text.0 = content.header.clone();
        }
    }
    for mut text in &mut texts.p1() {
        if text.0 != content.body {
            text.0 = content.body.clone();
        }
    }
    for mut text in &mut texts.p2() {
        if text.0 != content.choices {
            text.0 = content.choices.clone();
        }
    }
    for mut text in &mut texts.p3() {
        if text.0 != content.prompt {
            text.0 = content.prompt.to_string();
        }
    }
}
