//! Tests for session rebuild and history replay.

use std::sync::Arc;

use futures_util::StreamExt;
use lumen_common::{Configuration, Message, Personality, Role};

use super::*;
use crate::instruction::{build_system_instruction, tone_directive};
use crate::provider::{Part, TurnContent};
use crate::testing::FakeProvider;
use crate::AiError;

fn manager() -> (FakeProvider, SessionManager) {
    let fake = FakeProvider::new();
    let manager = SessionManager::new(Arc::new(fake.clone()), Configuration::default()).unwrap();
    (fake, manager)
}

fn history() -> Vec<Message> {
    vec![
        Message::user("My name is Ada."),
        Message::assistant("Nice to meet you, Ada."),
        Message::user("What is my name?"),
        Message::assistant("Your name is Ada."),
    ]
}

#[test]
fn new_self_initializes_empty_session() {
    let (fake, manager) = manager();
    assert!(manager.current().is_ok());
    assert!(manager.session_id().is_some());

    let created = fake.created();
    assert_eq!(created.len(), 1);
    assert!(created[0].history.is_empty());
    assert_eq!(created[0].model_id, Configuration::default().model_id);
}

#[test]
fn reconfigure_binds_new_config_and_replays_history() {
    let (fake, mut manager) = manager();
    let c2 = Configuration {
        model_id: "gemini-2.5-pro".into(),
        personality: Personality::Strict,
        custom_instruction: Some("Be brief.".into()),
        temperature: 0.2,
        max_output_tokens: 256,
        extended_reasoning_enabled: true,
        extended_reasoning_budget: Some(4096),
    };
    let h = history();

    manager.reconfigure(c2.clone(), &h).unwrap();

    let created = fake.created();
    assert_eq!(created.len(), 2);
    let bound = &created[1];
    assert_eq!(bound.model_id, "gemini-2.5-pro");
    assert_eq!(bound.config.system_instruction(), build_system_instruction(&c2));
    assert!(bound
        .config
        .system_instruction()
        .contains(tone_directive(Personality::Strict)));
    assert_eq!(bound.config.temperature(), 0.2);
    assert_eq!(bound.config.max_output_tokens(), 256);
    assert_eq!(bound.config.thinking_budget(), Some(4096));

    assert_eq!(bound.history.len(), h.len());
    for (content, msg) in bound.history.iter().zip(&h) {
        assert_eq!(content.role, msg.role);
        assert_eq!(content.parts, vec![Part::text(msg.text.clone())]);
    }
    assert_eq!(bound.history[0].role, Role::User);
    assert_eq!(bound.history[3].role, Role::Assistant);
    assert_eq!(manager.config(), &c2);
}

#[test]
fn reconfigure_with_equal_inputs_still_rebuilds() {
    let (fake, mut manager) = manager();
    let config = Configuration {
        personality: Personality::Friendly,
        ..Configuration::default()
    };
    let h = history();

    manager.reconfigure(config.clone(), &h).unwrap();
    let first = manager.current().unwrap();
    manager.reconfigure(config.clone(), &h).unwrap();
    let second = manager.current().unwrap();

    assert_ne!(first.id(), second.id());
    let created = fake.created();
    assert_eq!(created.len(), 3);
    assert_eq!(created[1].config, created[2].config);
    assert_eq!(created[1].history, created[2].history);
    assert_eq!(created[2].history.len(), h.len());
}

#[tokio::test]
async fn replaced_session_refuses_new_turns() {
    let (fake, mut manager) = manager();
    let old = manager.current().unwrap();
    manager
        .reconfigure(Configuration::default(), &history())
        .unwrap();

    assert!(old.is_retired());
    let items: Vec<_> = old
        .stream_turn(TurnContent::TextOnly("hello?".into()))
        .collect()
        .await;
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(AiError::SessionUnavailable)));
    assert!(fake.turns().is_empty());

    assert!(!manager.current().unwrap().is_retired());
}

#[test]
fn invalid_config_keeps_current_session() {
    let (fake, mut manager) = manager();
    let before = manager.current().unwrap();
    let bad = Configuration {
        temperature: 7.0,
        ..Configuration::default()
    };

    let err = manager.reconfigure(bad, &history()).unwrap_err();
    assert!(matches!(err, AiError::InvalidConfig(_)));
    assert_eq!(manager.current().unwrap().id(), before.id());
    assert!(!before.is_retired());
    assert_eq!(manager.config(), &Configuration::default());
    assert_eq!(fake.created().len(), 1);
}

#[test]
fn failed_rebuild_empties_slot_then_self_heals() {
    let (fake, mut manager) = manager();
    let config = Configuration {
        personality: Personality::Creative,
        ..Configuration::default()
    };
    fake.fail_next_create(true);

    assert!(manager.reconfigure(config.clone(), &history()).is_err());
    assert!(matches!(manager.current(), Err(AiError::SessionUnavailable)));
    assert_eq!(manager.config(), &config);

    let healed = manager.ensure_current().unwrap();
    assert!(!healed.is_retired());
    let created = fake.created();
    let last = created.last().unwrap();
    assert!(last.history.is_empty());
    assert_eq!(last.config.system_instruction(), build_system_instruction(&config));
}
