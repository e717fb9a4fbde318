#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tempfile::TempDir;

use name_info_core::{
    Clock, CommandEvent, CommandResponse, CommandSender, ExplicitCommand, NameInfoPlugin,
    ObserveOutcome, PlayerError, PlayerHandle, PluginConfig, UserId,
};

pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Instant::now()),
        })
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[derive(Debug, Default)]
pub struct FakePlayer {
    pub user_id: String,
    pub original: Option<String>,
    pub display_name: String,
    pub custom_info: String,
    pub console: Vec<(String, String)>,
    pub display_name_sets: usize,
    pub custom_info_sets: usize,
    pub reject_display_name: bool,
    pub reject_custom_info: bool,
    pub panic_on_user_id: bool,
}

impl FakePlayer {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Self::default()
        }
    }

    pub fn with_original(mut self, nickname: &str) -> Self {
        self.original = Some(nickname.to_string());
        self
    }

    pub fn id(&self) -> UserId {
        UserId::from(self.user_id.as_str())
    }

    pub fn console_messages(&self) -> Vec<&str> {
        self.console.iter().map(|(message, _)| message.as_str()).collect()
    }
}

impl PlayerHandle for FakePlayer {
    fn user_id(&self) -> UserId {
        if self.panic_on_user_id {
            panic!("player wrapper torn down");
        }
        self.id()
    }

    fn original_nickname(&self) -> Option<String> {
        self.original.clone()
    }

    fn set_display_name(&mut self, name: &str) -> Result<(), PlayerError> {
        if self.reject_display_name {
            return Err(PlayerError::FieldRejected {
                field: "DisplayName",
                reason: "wrapper is read-only".into(),
            });
        }
        self.display_name_sets += 1;
        self.display_name = name.to_string();
        Ok(())
    }

    fn set_custom_info(&mut self, info: &str) -> Result<(), PlayerError> {
        if self.reject_custom_info {
            return Err(PlayerError::FieldRejected {
                field: "CustomInfo",
                reason: "wrapper is read-only".into(),
            });
        }
        self.custom_info_sets += 1;
        self.custom_info = info.to_string();
        Ok(())
    }

    fn send_console_message(&mut self, message: &str, color: &str) {
        self.console.push((message.to_string(), color.to_string()));
    }
}

impl CommandSender for FakePlayer {
    fn as_player(&mut self) -> Option<&mut dyn PlayerHandle> {
        Some(self)
    }
}

pub struct ServerConsole;

impl CommandSender for ServerConsole {
    fn as_player(&mut self) -> Option<&mut dyn PlayerHandle> {
        None
    }
}

pub struct FakeEvent<'a> {
    pub name: String,
    pub args: Vec<String>,
    pub sender: &'a mut dyn CommandSender,
    pub handled: bool,
    pub has_handled_flag: bool,
}

impl<'a> FakeEvent<'a> {
    pub fn new(name: &str, args: Vec<String>, sender: &'a mut dyn CommandSender) -> Self {
        Self {
            name: name.to_string(),
            args,
            sender,
            handled: false,
            has_handled_flag: true,
        }
    }
}

impl CommandEvent for FakeEvent<'_> {
    fn command_name(&self) -> &str {
        &self.name
    }

    fn arguments(&self) -> &[String] {
        &self.args
    }

    fn sender(&mut self) -> &mut dyn CommandSender {
        &mut *self.sender
    }

    fn mark_handled(&mut self) -> bool {
        if self.has_handled_flag {
            self.handled = true;
        }
        self.has_handled_flag
    }
}

pub fn args(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

pub struct Fixture {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
    pub plugin: NameInfoPlugin,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Persistence always fails: the config directory does not exist.
    pub fn unwritable() -> Self {
        Self::with_config(|config| {
            config.config_dir = config.config_dir.join("missing");
        })
    }

    pub fn with_config(adjust: impl FnOnce(&mut PluginConfig)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = PluginConfig::default().with_config_dir(dir.path());
        adjust(&mut config);
        Self::start(dir, config)
    }

    fn start(dir: TempDir, config: PluginConfig) -> Self {
        let clock = ManualClock::new();
        let plugin = NameInfoPlugin::with_clock(config, clock.clone());
        plugin.enable().expect("enable plugin");
        Self { dir, clock, plugin }
    }

    /// Simulates a process restart over the same config directory.
    pub fn restart(self) -> Self {
        let config = self.plugin.config().clone();
        Self::start(self.dir, config)
    }

    pub fn file_path(&self) -> PathBuf {
        self.plugin.store().path().to_path_buf()
    }

    pub fn file_contents(&self) -> String {
        std::fs::read_to_string(self.file_path()).unwrap_or_default()
    }

    pub fn explicit_name(&self, sender: &mut dyn CommandSender, text: &str) -> CommandResponse {
        self.plugin.name_command().execute(&args(text), sender)
    }

    pub fn explicit_info(&self, sender: &mut dyn CommandSender, text: &str) -> CommandResponse {
        self.plugin.info_command().execute(&args(text), sender)
    }

    pub fn ambient(
        &self,
        sender: &mut dyn CommandSender,
        command: &str,
        text: &str,
    ) -> (ObserveOutcome, bool) {
        let mut event = FakeEvent::new(command, args(text), sender);
        let outcome = self.plugin.observer().observe(&mut event);
        (outcome, event.handled)
    }
}
