use sailtest_core::fixture::Conversation;
use sailtest_core::test_utils::{conversation, hello_conversation};

fn canonical_conversations() -> Vec<Conversation> {
    vec![
        conversation("220 ready", &[]),
        hello_conversation(),
        conversation(
            "220 mail.example.org ESMTP",
            &[
                (&["EHLO client.example.org"], &["250-mail.example.org", "250-SIZE 1000000", "250 8BITMIME"]),
                (&["MAIL FROM:<a@example.org>", "RCPT TO:<b@example.org>"], &["250 ok", "250 ok"]),
                (&["DATA"], &["354 go ahead"]),
                (&["Subject: hi", "", "body", "."], &["250 queued"]),
            ],
        ),
        conversation("220 ready", &[(&[], &["421 closing"])]),
    ]
}

#[test]
fn parse_inverts_unparse_for_canonical_conversations() {
    for conv in canonical_conversations() {
        let text = conv.unparse();
        assert_eq!(Conversation::parse(&text), conv, "round trip of:\n{text}");
    }
}

#[test]
fn unparse_is_idempotent_on_canonical_text() {
    for conv in canonical_conversations() {
        let once = conv.unparse();
        let twice = Conversation::parse(&once).unparse();
        assert_eq!(once, twice);
    }
}

#[test]
fn every_line_is_crlf_terminated() {
    let text = hello_conversation().unparse();
    assert!(text.ends_with("\r\n"));
    assert_eq!(text.matches("\r\n").count(), text.lines().count());
}

#[test]
fn blank_trailing_lines_are_ignored() {
    let mut text = hello_conversation().unparse();
    text.push_str("\r\n\r\n");
    assert_eq!(Conversation::parse(&text), hello_conversation());
}

#[tokio::test]
async fn store_then_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("happy_path.txt");

    hello_conversation().store(&path).await.unwrap();
    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        on_disk,
        "S: 220 ready\r\nC: HELLO\r\nS: 250 ok\r\nC: QUIT\r\nS: 221 bye\r\n"
    );
    assert_eq!(Conversation::load(&path).await.unwrap(), hello_conversation());
}

#[test]
fn bundled_fixtures_are_canonical() {
    for text in [
        include_str!("../../fixtures/happy_path.txt"),
        include_str!("../../fixtures/abortive.txt"),
    ] {
        let conv = Conversation::parse(text);
        assert_eq!(conv.initial_response, "220 localhost ESMTP saild");
        assert_eq!(conv.exchanges[0].response_lines.len(), 3);
        assert_eq!(conv.unparse(), text);
    }
}

#[test]
fn happy_path_data_body_is_one_exchange() {
    let conv = Conversation::parse(include_str!("../../fixtures/happy_path.txt"));
    let body = &conv.exchanges[4];
    assert_eq!(body.command_lines, vec!["Subject: hello", "", "Hi Bob.", "."]);
    assert_eq!(body.response_lines, vec!["250 OK"]);
}
