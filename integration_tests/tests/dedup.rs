mod common;

use std::thread;
use std::time::Duration;

use common::{FakePlayer, Fixture, ServerConsole};
use name_info_core::{CommandKind, Feedback, LedgerCheck, ObserveOutcome, UserId};

#[test]
fn ambient_skips_command_the_registry_just_handled() {
    let fixture = Fixture::new();
    let mut player = FakePlayer::new("u1");

    let response = fixture.explicit_name(&mut player, "Alice");
    assert!(response.success);

    fixture.clock.advance(Duration::from_millis(4_900));
    let (outcome, handled) = fixture.ambient(&mut player, ".n", "Alice");

    assert_eq!(outcome, ObserveOutcome::Deduplicated(CommandKind::Name));
    assert!(!handled);
    assert_eq!(player.display_name_sets, 1);
    assert!(player.console.is_empty(), "no duplicate console message");
}

#[test]
fn ambient_applies_again_once_the_window_has_passed() {
    let fixture = Fixture::new();
    let mut player = FakePlayer::new("u1");

    fixture.explicit_name(&mut player, "Alice");
    fixture.clock.advance(Duration::from_secs(5));
    let (outcome, handled) = fixture.ambient(&mut player, "name", "Alice");

    assert!(matches!(
        outcome,
        ObserveOutcome::Applied { success: true, .. }
    ));
    assert!(handled);
    assert_eq!(player.display_name_sets, 2);
    assert_eq!(player.console_messages(), vec!["Nickname set to Alice"]);
}

#[test]
fn a_mark_suppresses_only_one_later_delivery() {
    let fixture = Fixture::new();
    let mut player = FakePlayer::new("u1");

    fixture.explicit_info(&mut player, "likes cats");
    let (first, _) = fixture.ambient(&mut player, "info", "likes cats");
    let (second, _) = fixture.ambient(&mut player, "info", "likes cats");

    assert_eq!(first, ObserveOutcome::Deduplicated(CommandKind::Info));
    assert!(matches!(second, ObserveOutcome::Applied { .. }));
    assert_eq!(player.custom_info_sets, 2);
}

#[test]
fn ambient_path_never_marks_the_ledger() {
    let fixture = Fixture::new();
    let mut player = FakePlayer::new("u1");

    fixture.ambient(&mut player, ".info", "first");
    assert!(fixture.plugin.ledger().is_empty());

    let (outcome, _) = fixture.ambient(&mut player, ".info", "second");
    assert!(matches!(outcome, ObserveOutcome::Applied { .. }));
    assert_eq!(
        fixture.plugin.store().get(&player.id()).as_deref(),
        Some("second")
    );
}

#[test]
fn mark_for_another_command_does_not_suppress() {
    let fixture = Fixture::new();
    let mut player = FakePlayer::new("u1");

    fixture.explicit_name(&mut player, "Alice");
    let (outcome, _) = fixture.ambient(&mut player, "info", "likes cats");

    assert!(matches!(
        outcome,
        ObserveOutcome::Applied {
            command: CommandKind::Info,
            ..
        }
    ));
    assert!(fixture.plugin.ledger().is_empty(), "entry consumed anyway");
}

#[test]
fn unrelated_commands_leave_the_ledger_alone() {
    let fixture = Fixture::new();
    let mut player = FakePlayer::new("u1");

    fixture.explicit_name(&mut player, "Alice");
    let (outcome, handled) = fixture.ambient(&mut player, ".help", "");
    assert_eq!(outcome, ObserveOutcome::Unrelated);
    assert!(!handled);

    let (outcome, _) = fixture.ambient(&mut player, ".N", "Alice");
    assert_eq!(outcome, ObserveOutcome::Deduplicated(CommandKind::Name));
}

#[test]
fn console_sender_is_ignored_by_ambient_path() {
    let fixture = Fixture::new();
    let (outcome, handled) = fixture.ambient(&mut ServerConsole, "info", "hello");
    assert_eq!(outcome, ObserveOutcome::NotAPlayer);
    assert!(!handled);
    assert!(fixture.plugin.store().is_empty());
}

#[test]
fn failed_explicit_command_does_not_suppress_ambient() {
    let fixture = Fixture::new();
    let mut player = FakePlayer::new("u1");
    let too_long = "x".repeat(33);

    let response = fixture.explicit_name(&mut player, &too_long);
    assert!(!response.success);
    assert!(fixture.plugin.ledger().is_empty());

    let (outcome, handled) = fixture.ambient(&mut player, "n", &too_long);
    assert!(matches!(
        outcome,
        ObserveOutcome::Applied {
            success: false,
            feedback: Feedback::NicknameInvalidLength,
            ..
        }
    ));
    assert!(!handled, "rejected commands are left for the host to report");
    assert_eq!(player.display_name_sets, 0);
}

#[test]
fn racing_paths_for_many_users_apply_each_command_once() {
    let fixture = Fixture::new();

    thread::scope(|scope| {
        for index in 0..8 {
            let fixture = &fixture;
            scope.spawn(move || {
                let mut player = FakePlayer::new(&format!("user-{index}"));
                let text = format!("note {index}");
                fixture.explicit_info(&mut player, &text);
                let (outcome, _) = fixture.ambient(&mut player, ".cinfo", &text);
                assert_eq!(outcome, ObserveOutcome::Deduplicated(CommandKind::Info));
                assert_eq!(player.custom_info_sets, 1);
            });
        }
    });

    assert_eq!(fixture.plugin.store().len(), 8);
    assert_eq!(fixture.file_contents().lines().count(), 8);
    assert_eq!(
        fixture
            .plugin
            .ledger()
            .consume_if_fresh(&UserId::from("user-3"), CommandKind::Info, Duration::from_secs(5)),
        LedgerCheck::Missing
    );
}
