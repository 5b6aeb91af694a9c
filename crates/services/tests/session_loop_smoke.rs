use std::path::PathBuf;
use std::sync::Arc;

use buddy_core::catalog::{PRACTICE_QUESTIONS, SESSION_COMPLETE_LINE};
use buddy_core::model::{CaptureResult, PromptList, RoundOutcome};
use buddy_core::scoring::{FallbackResolver, SynonymResolver};
use buddy_core::time::fixed_clock;
use services::{
    AdvanceOutcome, AppServices, BuddyConfig, ScriptedCapture, ScriptedSpeechService,
    SessionEvent, SessionTiming,
};
use storage::Storage;

fn services_with(speech: &ScriptedSpeechService) -> AppServices {
    let config = BuddyConfig {
        timing: SessionTiming::immediate(),
        ..BuddyConfig::default()
    };
    AppServices::from_parts(
        config,
        fixed_clock(),
        Storage::in_memory(fixed_clock()),
        Arc::new(speech.clone()),
        Arc::new(FallbackResolver::new()),
    )
}

#[tokio::test]
async fn practice_session_records_every_question() {
    let speech = ScriptedSpeechService::new([
        ScriptedCapture::transcript("I like hiking"),
        ScriptedCapture::Answer(CaptureResult::new(
            None,
            Some(PathBuf::from("recordings/answer_20231114_221320.wav")),
        )),
        ScriptedCapture::Panic,
        ScriptedCapture::transcript("   "),
    ]);
    let services = services_with(&speech);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut sequencer = services.sequencer().with_events(tx);

    sequencer.start(PromptList::new(PRACTICE_QUESTIONS).unwrap());
    let records = sequencer.run().await.unwrap().to_vec();

    assert_eq!(records.len(), PRACTICE_QUESTIONS.len());
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record.index, index);
        assert_eq!(record.prompt, PRACTICE_QUESTIONS[index]);
    }
    assert_eq!(records[0].transcript.as_deref(), Some("I like hiking"));
    assert!(records[1].transcript.is_none());
    assert!(records[1].saved_path.is_some());
    assert!(records[2].is_unanswered());
    assert!(records[3].is_unanswered(), "blank transcript counts as absent");
    assert!(records[4].is_unanswered());

    assert_eq!(sequencer.advance().await.unwrap(), AdvanceOutcome::Completed);
    assert_eq!(
        speech.spoken().last().map(String::as_str),
        Some(SESSION_COMPLETE_LINE)
    );

    drop(sequencer);
    let mut completed = Vec::new();
    while let Some(event) = rx.recv().await {
        if let SessionEvent::Completed { answered } = event {
            completed.push(answered);
        }
    }
    assert_eq!(completed, vec![1]);
}

#[tokio::test]
async fn synonym_and_repeat_games_share_one_speech_service() {
    let speech = ScriptedSpeechService::default();
    let services = services_with(&speech);

    let mut synonyms = services.synonym_game().with_seed(11);
    let round = synonyms.new_round().unwrap();
    let word = round.display_text().to_owned();
    let answer = services
        .resolver()
        .synonyms_of(&word)
        .into_iter()
        .next()
        .unwrap();
    speech.push(ScriptedCapture::transcript(&format!("maybe {answer}")));
    let round = synonyms.listen().await.unwrap();
    assert!(matches!(round.outcome(), RoundOutcome::Matched { .. }));

    let mut repeat = services.repeat_game(true).with_seed(5);
    repeat.new_round().unwrap();
    speech.push(ScriptedCapture::transcript("something else entirely"));
    let round = repeat.listen().await.unwrap();
    assert!(matches!(round.outcome(), RoundOutcome::Scored { .. }));
}
