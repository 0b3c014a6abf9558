/// Conversations as the web client persisted them, unsorted and with
/// timestamp based ids.
pub fn legacy_conversations_fixture() -> &'static str {
    return r#"
[
  {
    "id": "conv_1700000001000",
    "title": "Open YouTube",
    "messages": [
      { "role": "user", "content": "Open YouTube" },
      { "role": "assistant", "content": "Opening YouTube..." }
    ],
    "createdAt": 1700000001000,
    "updatedAt": 1700000002000
  },
  {
    "id": "conv_1700000003000",
    "title": "What's the weather like?",
    "messages": [
      { "role": "user", "content": "What's the weather like?" },
      { "role": "assistant", "content": "I can't check live weather, but I can search for it." }
    ],
    "createdAt": 1700000003000,
    "updatedAt": 1700000004000
  }
]
"#
    .trim();
}

/// Saved apps as the web client persisted them. The first entry predates
/// aliases.
pub fn legacy_apps_fixture() -> &'static str {
    return r#"
[
  {
    "id": "app_1700000000001",
    "displayName": "Mom",
    "url": "tel:+15551234567",
    "createdAt": 1700000000001
  },
  {
    "id": "app_1700000000002",
    "displayName": "Spotify",
    "url": "spotify://",
    "aliases": ["music", "songs"],
    "createdAt": 1700000000002
  }
]
"#
    .trim();
}
