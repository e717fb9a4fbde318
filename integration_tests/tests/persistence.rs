mod common;

use std::fs;

use common::{FakePlayer, Fixture};
use name_info_core::{AttributeStore, PlayerHandle, UserId};

#[test]
fn custom_info_survives_restart() {
    let fixture = Fixture::new();
    let mut player = FakePlayer::new("u1");
    fixture.explicit_info(&mut player, "likes cats");

    let fixture = fixture.restart();

    assert_eq!(
        fixture.plugin.store().get(&UserId::from("u1")).as_deref(),
        Some("likes cats")
    );
}

#[test]
fn arbitrary_text_round_trips_through_the_file() -> anyhow::Result<()> {
    let fixture = Fixture::new();
    let text = "tab\there\nnew ✓ 日本";
    fixture.plugin.store().set(&UserId::from("u1"), text)?;

    assert_eq!(fixture.file_contents().lines().count(), 1);
    let fixture = fixture.restart();

    assert_eq!(
        fixture.plugin.store().get(&UserId::from("u1")).as_deref(),
        Some(text)
    );
    Ok(())
}

#[test]
fn file_lists_one_line_per_user_sorted_by_id() {
    let fixture = Fixture::new();
    for (id, text) in [("u2", "second"), ("u1", "first"), ("u3", "third")] {
        let mut player = FakePlayer::new(id);
        fixture.explicit_info(&mut player, text);
    }
    let mut player = FakePlayer::new("u2");
    fixture.explicit_info(&mut player, "");

    let ids: Vec<String> = fixture
        .file_contents()
        .lines()
        .map(|line| line.split('\t').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["u1", "u3"]);
}

#[test]
fn reset_is_idempotent_and_removes_the_line() {
    let fixture = Fixture::new();
    let mut player = FakePlayer::new("u1");
    fixture.explicit_info(&mut player, "likes cats");

    fixture.explicit_info(&mut player, "");
    let after_first = fixture.file_contents();
    fixture.explicit_info(&mut player, "");

    assert_eq!(after_first, "");
    assert_eq!(fixture.file_contents(), after_first);
    assert!(!fixture.plugin.store().contains(&player.id()));
}

#[test]
fn malformed_lines_are_skipped_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = AttributeStore::in_config_dir(dir.path());
    fs::write(
        store.path(),
        "u1\tbGlrZXMgY2F0cw==\nno-separator\nu2\t!!!not-base64!!!\n\nu3\taGk=\r\n",
    )
    .expect("seed file");

    let summary = store.load().expect("load");

    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(store.get(&UserId::from("u1")).as_deref(), Some("likes cats"));
    assert_eq!(store.get(&UserId::from("u3")).as_deref(), Some("hi"));
    assert!(!store.contains(&UserId::from("u2")));
}

#[test]
fn failed_saves_are_lost_across_restart() {
    let fixture = Fixture::unwritable();
    let mut player = FakePlayer::new("u1");
    fixture.explicit_info(&mut player, "likes cats");
    assert!(fixture.plugin.store().contains(&player.id()));

    let fixture = fixture.restart();

    assert!(fixture.plugin.store().is_empty());
}

#[test]
fn stored_info_is_restored_to_a_joining_player() {
    let fixture = Fixture::new();
    let mut before = FakePlayer::new("u1");
    fixture.explicit_info(&mut before, "likes cats");
    let fixture = fixture.restart();

    let mut rejoined = FakePlayer::new("u1");
    let report = fixture.plugin.restore_custom_info(&mut rejoined);

    assert_eq!(report.len(), 1);
    assert_eq!(rejoined.custom_info, "likes cats");

    let mut stranger = FakePlayer::new("u9");
    assert!(fixture.plugin.restore_custom_info(&mut stranger).is_empty());
    assert_eq!(stranger.custom_info_sets, 0);
    assert_eq!(stranger.user_id(), UserId::from("u9"));
}

#[test]
fn disabled_plugin_neither_loads_nor_registers() {
    let seeded = Fixture::new();
    let mut player = FakePlayer::new("u1");
    seeded.explicit_info(&mut player, "likes cats");
    let seeded_config = seeded.plugin.config().clone();

    let disabled = Fixture::with_config(|config| {
        *config = seeded_config;
        config.is_enabled = false;
    });

    assert!(!disabled.plugin.is_active());
    assert!(disabled.plugin.commands().is_empty());
    assert!(disabled.plugin.store().is_empty());
}
