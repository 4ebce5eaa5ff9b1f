use voyage_service::event::Notification;
use voyage_service::message::model::Message;
use voyage_service::{group, poll};

#[test]
fn should_tag_notifications_by_type() {
    let poll_id = poll::Id::random();
    let n = Notification::PollClosed {
        poll_id,
        winner: Some("Lisbon".into()),
    };

    let json = serde_json::to_value(&n).unwrap();

    assert_eq!(json["type"], "poll_closed");
    assert_eq!(json["poll_id"], poll_id.to_string());
    assert_eq!(json["winner"], "Lisbon");
}

#[test]
fn should_send_system_message_without_sender() {
    let group_id = group::Id::random();
    let n = Notification::NewMessage {
        message: Message::system(
            group_id,
            "Poll \"Where to?\" has ended. Winning option: \"Lisbon\" (0 votes)",
        ),
    };

    let json = serde_json::to_value(&n).unwrap();

    assert_eq!(json["type"], "new_message");
    assert_eq!(json["message"]["group_id"], group_id.to_string());
    assert!(json["message"]["sender"].is_null());
}

#[test]
fn should_read_back_deleted_group() {
    let group_id = group::Id::random();
    let raw = format!(r#"{{"type":"group_deleted","group_id":"{group_id}"}}"#);

    let n: Notification = serde_json::from_str(&raw).unwrap();

    assert!(matches!(n, Notification::GroupDeleted { group_id: id } if id == group_id));
}
