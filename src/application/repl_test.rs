use yansi::Paint;

use super::format_app;
use super::format_conversation;
use super::help_text;
use super::EventPrinter;
use crate::domain::models::Conversation;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Notification;
use crate::domain::models::SavedApp;
use crate::domain::models::SessionStatus;

/// Colours stay off for the whole test binary, nothing asserts on them.
fn plain<T>(test: impl FnOnce() -> T) -> T {
    Paint::disable();
    return test();
}

#[test]
fn it_documents_every_slash_command() {
    let text = help_text();
    for cmd in [
        "/new", "/list", "/switch", "/delete", "/listen", "/apps", "/quit", "/help",
    ] {
        assert!(text.contains(cmd), "missing {cmd}");
    }
}

#[test]
fn it_formats_conversations() {
    let mut conversation = Conversation::new("Weather today", 0);
    conversation.id = "conv_1234".to_string();
    conversation.messages = vec![Message::user("What's the weather?")];

    let active = format_conversation(&conversation, true);
    assert!(active.starts_with("* (ID: conv_1234) "));
    assert!(active.ends_with(", Weather today, Messages: 1"));

    let inactive = format_conversation(&conversation, false);
    assert!(inactive.starts_with("- (ID: conv_1234) "));
}

#[test]
fn it_formats_apps() -> anyhow::Result<()> {
    let mut app = SavedApp::new("Spotify", "spotify://", &["music".to_string()], 0)?;
    app.id = "app_1234".to_string();
    insta::assert_snapshot!(format_app(&app), @"- (ID: app_1234) Spotify, spotify://, Aliases: music");

    app.aliases = vec![];
    insta::assert_snapshot!(format_app(&app), @"- (ID: app_1234) Spotify, spotify://");
    return Ok(());
}

#[test]
fn it_prints_streamed_replies_once() {
    plain(|| {
        let mut printer = EventPrinter::default();
        let mut out = "".to_string();
        for event in [
            Event::MessageAppended(Message::user("hi")),
            Event::ReplyChunk("Hello".to_string()),
            Event::ReplyChunk(" there".to_string()),
            Event::MessageAppended(Message::assistant("Hello there")),
        ] {
            out += &printer.format(&event).unwrap_or_default();
        }

        assert_eq!(out, "Jarvis: Hello there\n");
    });
}

#[test]
fn it_prints_unstreamed_replies() {
    plain(|| {
        let mut printer = EventPrinter::default();
        let res = printer.format(&Event::MessageAppended(Message::assistant("Opening Spotify...")));
        assert_eq!(res, Some("Jarvis: Opening Spotify...\n".to_string()));
    });
}

#[test]
fn it_echoes_transcripts() {
    plain(|| {
        let mut printer = EventPrinter {
            echo_user: true,
            ..EventPrinter::default()
        };
        let res = printer.format(&Event::MessageAppended(Message::user("open youtube")));
        assert_eq!(res, Some("You: open youtube\n".to_string()));
    });
}

#[test]
fn it_ends_streams_on_notifications() {
    plain(|| {
        let mut printer = EventPrinter::default();
        printer.format(&Event::ReplyChunk("Hel".to_string()));
        let res = printer.format(&Event::Notification(Notification::error(
            "The chat service failed: boom",
        )));
        assert_eq!(res, Some("\nThe chat service failed: boom\n".to_string()));
    });
}

#[test]
fn it_only_prints_audio_statuses() {
    plain(|| {
        let mut printer = EventPrinter::default();
        assert_eq!(printer.format(&Event::StatusChanged(SessionStatus::Processing)), None);
        assert_eq!(printer.format(&Event::StatusChanged(SessionStatus::Idle)), None);
        assert_eq!(
            printer.format(&Event::StatusChanged(SessionStatus::Speaking)),
            Some("Speaking...\n".to_string())
        );
    });
}

struct BrokenPipe {
    written: Vec<u8>,
}

impl std::io::Write for BrokenPipe {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.written.extend_from_slice(buf);
        return Ok(buf.len());
    }

    fn flush(&mut self) -> std::io::Result<()> {
        return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
    }
}

#[test]
fn it_keeps_printing_when_flushing_fails() {
    plain(|| {
        let mut printer = EventPrinter::default();
        let mut out = BrokenPipe { written: vec![] };

        printer.write(&Event::ReplyChunk("Hel".to_string()), &mut out);
        printer.write(&Event::ReplyChunk("lo".to_string()), &mut out);
        printer.write(&Event::StatusChanged(SessionStatus::Idle), &mut out);

        assert!(String::from_utf8_lossy(&out.written).ends_with("Hello"));
    });
}
