use anyhow::Result;

use super::Message;
use super::Role;

#[test]
fn it_serializes_roles_in_lowercase() -> Result<()> {
    let payload = serde_json::to_string(&Message::assistant("Hello"))?;
    insta::assert_snapshot!(payload, @r###"{"role":"assistant","content":"Hello"}"###);
    return Ok(());
}

#[test]
fn it_reads_messages_written_by_the_web_client() -> Result<()> {
    let message: Message = serde_json::from_str(r#"{"role":"user","content":"YouTube खोलो"}"#)?;
    assert_eq!(message.role, Role::User);
    assert_eq!(message.content, "YouTube खोलो");
    assert!(message.is_user());
    return Ok(());
}

#[test]
fn it_rejects_unknown_roles() {
    let res = serde_json::from_str::<Message>(r#"{"role":"system","content":"x"}"#);
    assert!(res.is_err());
}
