use super::*;

fn msg(text: &str) -> ChatMessage {
    ChatMessage {
        text: text.to_string(),
        outgoing: false,
        sender: None,
        avatar: None,
        appear_at_sec: None,
    }
}

fn authored(text: &str, at: f64) -> ChatMessage {
    ChatMessage {
        appear_at_sec: Some(at),
        ..msg(text)
    }
}

#[test]
fn derived_schedule_accumulates_typing_delays() {
    let schedule = reveal_schedule(&[msg("hi"), msg("ok")]);
    // Short messages clamp to the minimum delay.
    assert_eq!(schedule, vec![MIN_MESSAGE_SEC, 2.0 * MIN_MESSAGE_SEC]);
}

#[test]
fn long_messages_clamp_to_the_maximum_delay() {
    let long = "a".repeat(500);
    let schedule = reveal_schedule(&[msg(&long)]);
    assert_eq!(schedule, vec![MAX_MESSAGE_SEC]);
}

#[test]
fn medium_message_delay_scales_with_length() {
    // 30 chars at 15 cps is 2 seconds, inside the clamp band.
    let schedule = reveal_schedule(&[msg(&"a".repeat(30))]);
    assert!((schedule[0] - 2.0).abs() < 1e-9);
}

#[test]
fn authored_times_pin_messages() {
    let schedule = reveal_schedule(&[authored("a", 1.0), authored("b", 4.5)]);
    assert_eq!(schedule, vec![1.0, 4.5]);
}

#[test]
fn schedule_is_monotonic_even_with_out_of_order_authoring() {
    let schedule = reveal_schedule(&[authored("a", 5.0), authored("b", 2.0)]);
    assert_eq!(schedule, vec![5.0, 5.0]);
}

#[test]
fn authored_and_derived_timing_mix() {
    let schedule = reveal_schedule(&[authored("a", 2.0), msg("ok")]);
    assert_eq!(schedule[0], 2.0);
    assert!((schedule[1] - (2.0 + MIN_MESSAGE_SEC)).abs() < 1e-9);
}

#[test]
fn empty_conversation_has_empty_schedule() {
    assert!(reveal_schedule(&[]).is_empty());
}

#[test]
fn sender_labels_only_apply_to_incoming_messages() {
    let incoming = ChatMessage {
        sender: Some("Sam".to_string()),
        ..msg("hi")
    };
    assert_eq!(sender_label(&incoming), Some("Sam"));

    let outgoing = ChatMessage {
        outgoing: true,
        sender: Some("Sam".to_string()),
        ..msg("hi")
    };
    assert_eq!(sender_label(&outgoing), None);
}

#[test]
fn blank_sender_names_are_dropped() {
    assert_eq!(sender_label(&msg("hi")), None);
    let blank = ChatMessage {
        sender: Some("   ".to_string()),
        ..msg("hi")
    };
    assert_eq!(sender_label(&blank), None);
    let padded = ChatMessage {
        sender: Some(" Sam ".to_string()),
        ..msg("hi")
    };
    assert_eq!(sender_label(&padded), Some("Sam"));
}
