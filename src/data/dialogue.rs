use crate::shared::*;

fn lines(texts: &[&str]) -> LineSet {
    texts.iter().map(|t| DialogueEntry::plain(*t)).collect()
}

fn reply(label: &str, texts: &[&str]) -> Choice {
    Choice::new(
        label,
        ChoiceNext::Lines(texts.iter().map(|t| DialogueEntry::plain(*t)).collect()),
    )
}

/// Built-in conversations, one `DialogueDef` per NPC id.
pub fn populate_dialogue(registry: &mut DialogueRegistry) {
    registry.insert(
        "워니",
        DialogueDef::new(vec![
            vec![
                DialogueEntry::plain("안녕 오늘도 하루가 시작됐네"),
                DialogueEntry::plain("진짜 오늘도 일가고 내일도 일가고"),
                DialogueEntry::branching(
                    "주 100시간제가 도입된대…",
                    vec![
                        reply("헉… 괜찮아?", &["괜찮진 않은데 버텨야지…"]),
                        reply("그만둬!", &["그건… 현실적으로 쉽지 않다…"]),
                    ],
                ),
            ],
            lines(&["왜 뭐 할말 있어??"]),
            lines(&["음 이제 말 그만 걸어줄레??"]),
            lines(&["나 이제 일 가야해"]),
        ]),
    );

    registry.insert(
        "상미니",
        DialogueDef::new(vec![
            lines(&["원희야", "그림", "화이팅이다"]),
            vec![DialogueEntry::branching(
                "퀄리티 기대 할께!",
                vec![
                    reply("고마워!", &["기대는 좋은 힘이지 ㅎㅎ"]),
                    reply("부담돼…", &["부담 느끼지 말고 너 페이스로!"]),
                ],
            )],
            lines(&["음 이제 말 그만 걸어줄레??"]),
            lines(&["아 좀 가라고;;"]),
        ]),
    );

    registry.insert(
        "엘테리아 시민",
        DialogueDef::new(vec![
            vec![
                DialogueEntry::plain("어서 와요, 엘테리아에 온 걸 환영해요."),
                DialogueEntry::branching(
                    "은행에 볼일이 있나요?",
                    vec![
                        reply("네, 어디죠?", &["광장 한가운데 큰 문이 은행이에요.", "F 키로 들어가 보세요."]),
                        Choice::new("아니요", ChoiceNext::Line("그럼 즐거운 구경 되세요!".to_string())),
                        Choice::new("그냥 지나가요", ChoiceNext::End),
                    ],
                ),
            ],
            lines(&["카지노는 북쪽 골목 끝에 있어요.", "돈은 조심히 쓰세요."]),
            lines(&["오늘 날씨가 참 좋네요."]),
        ]),
    );

    registry.insert(
        "연맹 파수꾼",
        DialogueDef::new(vec![
            lines(&[
                "안녕, 여행자! 하늘섬 연맹에 처음 왔나?",
                "지도에서 북동쪽으로 가면 오래된 비석이 있어.",
                "거기서 바람소리를 잘 들어보게.",
            ]),
            lines(&["비석은 찾았나? 바람이 길을 알려줄 걸세."]),
        ]),
    );

    registry.insert(
        "상인 로웰",
        DialogueDef::new(vec![lines(&[
            "오오, 모험가의 눈빛이군!",
            "필요한 게 있으면 언제든지 찾아오라고.",
        ])]),
    );
}
