//! End-to-end runs of the gating flow against a recording messenger
//!
//! Run with: cargo test --test gate_scenario_test

use std::collections::BTreeMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use kinogate::core::{Catalog, Channel};
use kinogate::gate::messages::{self, CONFIRM_ACTION};
use kinogate::gate::{
    ButtonKind, ConfirmOutcome, GateFlow, MembershipStatus, MessageRef, RedeemOutcome, Sender, StartOutcome,
};
use kinogate::storage::{RecordStore, UserRecord};
use kinogate::testing::{Outbound, RecordingMessenger};

const ADMIN: i64 = 6067594310;
const USER_A: u64 = 700100;

fn channels() -> Vec<Channel> {
    vec![
        Channel {
            name: "Kanal 1".to_string(),
            link: "https://t.me/+g5pGoUg7fbkwNzM1".to_string(),
            id: -1003000935874,
        },
        Channel {
            name: "Kanal 2".to_string(),
            link: "https://t.me/kanal2".to_string(),
            id: -1003000935875,
        },
    ]
}

struct Bot {
    dir: TempDir,
    messenger: Arc<RecordingMessenger>,
    flow: GateFlow,
}

impl Bot {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RecordStore::new(dir.path().join("pending.json")));
        let messenger = Arc::new(RecordingMessenger::new());
        let flow = GateFlow::new(messenger.clone(), store, channels(), Catalog::default(), Some(ADMIN));
        Self { dir, messenger, flow }
    }

    fn store_path(&self) -> std::path::PathBuf {
        self.dir.path().join("pending.json")
    }
}

#[tokio::test]
async fn test_full_redemption_scenario() {
    let bot = Bot::new();
    let a = Sender::new(USER_A, USER_A as i64, "Aziz Karimov");
    let prompt = MessageRef {
        chat_id: USER_A as i64,
        message_id: 1,
    };

    // start → channel prompt
    assert_eq!(bot.flow.start(&a).await, StartOutcome::Prompted);
    let sent = bot.messenger.take();
    let Outbound::Text { keyboard: Some(keyboard), .. } = &sent[0] else {
        panic!("expected a prompt with buttons, got {:?}", sent);
    };
    let links = keyboard
        .iter()
        .flatten()
        .filter(|b| matches!(b.kind, ButtonKind::Link(_)))
        .count();
    assert_eq!(links, 2);
    assert!(!bot.store_path().exists());

    // every channel positive → confirm
    for channel in channels() {
        bot.messenger.set_membership(channel.id, Ok(MembershipStatus::Member));
    }
    assert_eq!(
        bot.flow.confirm(&a, "q1", CONFIRM_ACTION, Some(prompt)).await,
        ConfirmOutcome::Confirmed { newly: true }
    );
    let sent = bot.messenger.take();
    assert!(matches!(&sent[0], Outbound::Edit { text, .. } if text.starts_with("✅ Tabriklaymiz!")));

    let raw = std::fs::read_to_string(bot.store_path()).unwrap();
    assert_eq!(raw, format!("{{\n  \"{}\": {{\n    \"confirmed\": true\n  }}\n}}", USER_A));

    // "114" → file + admin notice
    assert_eq!(
        bot.flow.redeem(&a, "114").await,
        RedeemOutcome::Delivered { code: "114".to_string() }
    );
    let sent = bot.messenger.take();
    assert_eq!(sent.len(), 2);
    let catalog = Catalog::default();
    assert_eq!(
        sent[0],
        Outbound::File {
            chat_id: USER_A as i64,
            file_ref: catalog.file_for("114").unwrap().to_string(),
            caption: catalog.caption.clone(),
        }
    );
    let Outbound::Text { chat_id, text, .. } = &sent[1] else {
        panic!("expected admin notice, got {:?}", sent[1]);
    };
    assert_eq!(*chat_id, ADMIN);
    assert!(text.contains(&USER_A.to_string()));
    assert!(text.contains("114"));

    // "999" → invalid code, store untouched
    let before = std::fs::read_to_string(bot.store_path()).unwrap();
    assert_eq!(bot.flow.redeem(&a, "999").await, RedeemOutcome::InvalidCode);
    assert_eq!(
        bot.messenger.take(),
        vec![Outbound::Text {
            chat_id: USER_A as i64,
            text: messages::invalid_code_text(&catalog),
            keyboard: None,
        }]
    );
    assert_eq!(std::fs::read_to_string(bot.store_path()).unwrap(), before);
}

#[tokio::test]
async fn test_partial_membership_reprompts_exactly_missing_channels() {
    let bot = Bot::new();
    let a = Sender::new(USER_A, USER_A as i64, "Aziz");
    let [first, second]: [Channel; 2] = channels().try_into().unwrap();

    for (first_status, second_status, expected) in [
        (Ok(MembershipStatus::NotMember), Ok(MembershipStatus::Member), vec![first.id]),
        (Ok(MembershipStatus::Admin), Err(()), vec![second.id]),
        (Err(()), Err(()), vec![first.id, second.id]),
    ] {
        bot.messenger.set_membership(first.id, first_status);
        bot.messenger.set_membership(second.id, second_status);

        let outcome = bot.flow.confirm(&a, "q", CONFIRM_ACTION, None).await;
        assert_eq!(outcome, ConfirmOutcome::Missing(expected.clone()));

        let sent = bot.messenger.take();
        let Outbound::Text { keyboard: Some(keyboard), .. } = &sent[0] else {
            panic!("expected a re-prompt, got {:?}", sent);
        };
        assert_eq!(keyboard.len(), expected.len() + 1);
        assert_eq!(
            keyboard.last().unwrap()[0].kind,
            ButtonKind::Action(CONFIRM_ACTION.to_string())
        );
    }

    assert_eq!(bot.flow.store().get(USER_A).await, None);
}

#[tokio::test]
async fn test_corrupt_store_does_not_break_events() {
    let bot = Bot::new();
    std::fs::write(bot.store_path(), "][").unwrap();
    let a = Sender::new(USER_A, USER_A as i64, "Aziz");

    assert_eq!(bot.flow.start(&a).await, StartOutcome::Prompted);
    assert_eq!(bot.flow.redeem(&a, "111").await, RedeemOutcome::NotConfirmed);

    for channel in channels() {
        bot.messenger.set_membership(channel.id, Ok(MembershipStatus::Member));
    }
    bot.flow.confirm(&a, "q", CONFIRM_ACTION, None).await;

    assert_eq!(bot.flow.store().get(USER_A).await, Some(UserRecord { confirmed: true }));
}

#[tokio::test]
async fn test_confirmed_flag_survives_new_flow_instance() {
    let bot = Bot::new();
    let a = Sender::new(USER_A, USER_A as i64, "Aziz");
    for channel in channels() {
        bot.messenger.set_membership(channel.id, Ok(MembershipStatus::Member));
    }
    bot.flow.confirm(&a, "q", CONFIRM_ACTION, None).await;

    // a restart: fresh flow over the same document
    let messenger = Arc::new(RecordingMessenger::new());
    let store = Arc::new(RecordStore::new(bot.store_path()));
    let restarted = GateFlow::new(
        messenger.clone(),
        store,
        channels(),
        Catalog {
            caption: "c".to_string(),
            movies: BTreeMap::from([("111".to_string(), "f".to_string())]),
        },
        None,
    );

    assert_eq!(restarted.redeem(&a, "111").await, RedeemOutcome::Delivered { code: "111".to_string() });
    assert_eq!(restarted.start(&a).await, StartOutcome::AlreadyConfirmed);
}
